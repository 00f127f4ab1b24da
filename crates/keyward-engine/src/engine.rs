//! The crypto engine seam.

use crate::error::EngineResult;
use crate::key::{EngineKey, GenerateRequest};

/// One per-key signature check result from
/// [`CryptoEngine::verify_armored`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCheck {
    /// Short id of the checked key.
    pub key_id: String,
    /// Whether a signature from that key is present and verifies.
    pub valid: bool,
}

/// A parsed signed message together with its per-key check results.
#[derive(Debug, Clone)]
pub struct VerifiedMessage {
    /// The recovered message text.
    pub text: String,
    /// One check per supplied key, in the order the keys were supplied.
    pub checks: Vec<SignatureCheck>,
}

/// The cryptographic engine consumed by the Keyward service.
///
/// Implementations supply the primitives; the service supplies the
/// lifecycle, indirection, and resolution semantics on top. Engines are
/// injected at service construction — there is no implicit default
/// instance.
pub trait CryptoEngine: Send + Sync + 'static {
    /// The raw key type this engine produces and consumes.
    type Key: EngineKey;

    /// Generate a fresh key.
    ///
    /// The result is sealed under `request.passphrase` unless
    /// `request.unlocked` is set.
    ///
    /// # Errors
    ///
    /// Returns an error when generation or sealing fails.
    fn generate_key(&self, request: &GenerateRequest) -> EngineResult<Self::Key>;

    /// Parse one armored key block into the keys it contains, in block
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed armor or a non-key block.
    fn read_armored_keys(&self, armor: &str) -> EngineResult<Vec<Self::Key>>;

    /// SHA-256 digest of `bytes`.
    fn sha256(&self, bytes: &[u8]) -> Vec<u8>;

    /// Sign `text` with every key in `keys`, producing an armored signed
    /// message.
    ///
    /// # Errors
    ///
    /// Returns an error when any key is sealed, public, or not
    /// signing-capable.
    fn sign_text(&self, keys: &[&Self::Key], text: &str) -> EngineResult<String>;

    /// Parse an armored signed message and check it against each key in
    /// `keys`.
    ///
    /// A key with no matching signature in the message yields a negative
    /// check, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed armor or a non-message block.
    fn verify_armored(&self, keys: &[&Self::Key], armor: &str) -> EngineResult<VerifiedMessage>;

    /// Sign `plain` with `signing_keys`, then encrypt the signed message to
    /// every key in `recipient_keys`, producing an armored encrypted
    /// message.
    ///
    /// # Errors
    ///
    /// Returns an error when a signing key is unusable or a recipient has
    /// no encryption component.
    fn encrypt_and_sign(
        &self,
        signing_keys: &[&Self::Key],
        recipient_keys: &[&Self::Key],
        plain: &str,
    ) -> EngineResult<String>;

    /// Decrypt an armored encrypted message with `decryption_key`, then —
    /// when `verification_keys` is non-empty — require at least one
    /// embedded signature to verify against them.
    ///
    /// # Errors
    ///
    /// Returns an error when the message is not addressed to
    /// `decryption_key`, the key is sealed, or verification fails.
    fn decrypt_and_verify(
        &self,
        decryption_key: &Self::Key,
        verification_keys: &[&Self::Key],
        cipher: &str,
    ) -> EngineResult<String>;
}
