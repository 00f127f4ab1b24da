//! The raw engine key seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Outcome of an engine-side certification check on a key component.
///
/// Opaque to the service core: it is recorded verbatim in the key blueprint
/// and handed back to callers without interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// The component's certification verifies against the primary key.
    Valid,
    /// The component is past its expiration time.
    Expired,
    /// The component carries no certification at all.
    NoCertification,
    /// The component's certification does not verify.
    Invalid,
}

/// The public face of one key component: its canonical byte serialization
/// and the fingerprint derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPacket {
    /// Deterministic serialization of the component's public fields.
    pub canonical: Vec<u8>,
    /// Hex fingerprint of the canonical serialization.
    pub fingerprint: String,
}

impl KeyPacket {
    /// Short key id: the trailing 16 hex characters of the fingerprint.
    #[must_use]
    pub fn key_id(&self) -> String {
        let start = self.fingerprint.len().saturating_sub(16);
        self.fingerprint[start..].to_owned()
    }
}

/// Parameters for [`CryptoEngine::generate_key`](crate::CryptoEngine::generate_key).
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// User identities to certify into the key, e.g. `"Phil <phil@example.org>"`.
    pub user_ids: Vec<String>,
    /// Passphrase sealing the generated secret material. Ignored when
    /// `unlocked` is set.
    pub passphrase: String,
    /// Advisory key strength in bits. Engines with a fixed-strength
    /// algorithm accept and ignore it.
    pub size: u32,
    /// Leave the generated key unsealed.
    pub unlocked: bool,
    /// Expiration time; `None` generates a non-expiring key.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            user_ids: Vec::new(),
            passphrase: String::new(),
            size: 4096,
            unlocked: false,
            expires_at: None,
        }
    }
}

/// A raw engine key: one primary component plus zero or more subkeys.
///
/// `Clone` is part of the contract: a clone is a fully independent copy, so
/// mutating one (sealing, unsealing) never affects the other. The lifecycle
/// layer relies on this for its non-mutating unlock.
pub trait EngineKey: Clone + Send + Sync + 'static {
    /// Serialize to an ASCII-armored block, preserving the current sealed
    /// or clear state of the secret material.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be encoded.
    fn armor(&self) -> EngineResult<String>;

    /// Whether this key carries no secret material at all.
    fn is_public(&self) -> bool;

    /// Whether the primary secret material is currently clear (usable).
    ///
    /// Public keys report `false`.
    fn is_unlocked(&self) -> bool;

    /// Seal all clear secret material under `passphrase`, in place.
    ///
    /// Irreversible without the passphrase.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::KeyLocked`](crate::EngineError::KeyLocked)
    /// when there is no clear material to seal, or a seal/derivation error
    /// from the underlying primitives.
    fn lock_material(&mut self, passphrase: &str) -> EngineResult<()>;

    /// Attempt to unseal all sealed secret material with `passphrase`,
    /// in place.
    ///
    /// Returns `Ok(false)` when the passphrase does not open the seals (the
    /// key may be left partially unsealed and should be discarded);
    /// `Ok(true)` on success.
    ///
    /// # Errors
    ///
    /// Returns an error only for structural failures (corrupt sealed data).
    fn unlock_material(&mut self, passphrase: &str) -> EngineResult<bool>;

    /// The certified user identities, in certification order.
    fn user_ids(&self) -> Vec<String>;

    /// Expiration time of the primary component; `None` means never.
    fn expiration_time(&self) -> Option<DateTime<Utc>>;

    /// Check the primary component's self-certification.
    fn verify_primary(&self) -> VerificationStatus;

    /// The primary component's packet.
    fn primary_packet(&self) -> KeyPacket;

    /// Whether a usable signing component exists.
    fn can_sign(&self) -> bool;

    /// Whether a usable encryption component exists.
    fn can_encrypt(&self) -> bool;

    /// Drop all subkeys from this key.
    ///
    /// Used to probe the primary component's own capabilities without
    /// subkey capabilities leaking into the answer; call on a clone.
    fn detach_subkeys(&mut self);

    /// Number of subkeys.
    fn subkey_count(&self) -> usize;

    /// Packet of the subkey at `index`, if any.
    fn subkey_packet(&self, index: usize) -> Option<KeyPacket>;

    /// Whether the subkey at `index` is a valid signing key for this key's
    /// primary. Out-of-range indices report `false`.
    fn subkey_signing_capable(&self, index: usize) -> bool;

    /// Whether the subkey at `index` is a valid encryption key for this
    /// key's primary. Out-of-range indices report `false`.
    fn subkey_encryption_capable(&self, index: usize) -> bool;

    /// Check the binding certification of the subkey at `index` against the
    /// primary. Out-of-range indices report
    /// [`VerificationStatus::Invalid`].
    fn subkey_status(&self, index: usize) -> VerificationStatus;

    /// Expiration time of the subkey at `index`; `None` means never (or
    /// out of range).
    fn subkey_expiration(&self, index: usize) -> Option<DateTime<Utc>>;
}
