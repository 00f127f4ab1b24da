//! Engine error types.

use thiserror::Error;

/// Errors surfaced by a [`CryptoEngine`](crate::CryptoEngine) or an
/// [`EngineKey`](crate::EngineKey).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Armored input could not be parsed.
    #[error("malformed armor: {0}")]
    MalformedArmor(String),

    /// Armored input parsed, but carries the wrong kind of payload.
    #[error("unexpected armor kind: expected {expected}, got {actual}")]
    UnexpectedArmorKind {
        /// The armor label the operation required.
        expected: &'static str,
        /// The armor label actually found.
        actual: &'static str,
    },

    /// The armor checksum line does not match the decoded payload.
    #[error("armor checksum mismatch")]
    ChecksumMismatch,

    /// The operation needs clear secret material, but the key is sealed.
    #[error("key material is locked")]
    KeyLocked,

    /// The key has no usable signing component.
    #[error("key is not signing-capable")]
    NotSigningCapable,

    /// The key has no usable encryption component.
    #[error("key is not encryption-capable")]
    NotEncryptionCapable,

    /// An encrypted message carries no stanza addressed to this key.
    #[error("no matching recipient entry for this key")]
    NoMatchingRecipient,

    /// Decrypt-and-verify found no valid signature from the supplied keys.
    #[error("message verification failed: {key_ids}")]
    UnverifiedMessage {
        /// Comma-joined ids of the keys that failed verification.
        key_ids: String,
    },

    /// Authenticated encryption or decryption of sealed material failed.
    #[error("seal operation failed")]
    SealFailure,

    /// Passphrase key derivation failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// A payload could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
