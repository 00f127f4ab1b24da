//! Immutable descriptive snapshots of engine keys.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::Serialize;

use keyward_engine::{CryptoEngine, EngineKey, VerificationStatus};

/// The identity of one key component (the primary or a subkey).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyIdentity {
    /// Base64 SHA-256 of the component's canonical serialization. Stable
    /// content address of the component.
    pub hash: String,
    /// The component's hex fingerprint.
    pub fingerprint: String,
    /// Whether the component can produce signatures.
    pub can_sign: bool,
    /// Whether the component can receive encrypted data.
    pub can_encrypt: bool,
    /// The engine's certification verdict for the component, recorded
    /// verbatim.
    pub status: VerificationStatus,
    /// Expiration time; `None` means the component never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl KeyIdentity {
    /// Short key id: the trailing 16 hex characters of the fingerprint.
    #[must_use]
    pub fn key_id(&self) -> String {
        let start = self.fingerprint.len().saturating_sub(16);
        self.fingerprint[start..].to_owned()
    }
}

/// An immutable snapshot of an engine key's capabilities and state.
///
/// Built once per key; whenever a lifecycle operation changes the
/// underlying cryptographic state (unlock, lock), the resulting key gets a
/// freshly built blueprint. `is_locked` always reflects the actual
/// decryption state of the key's material at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyBlueprint {
    /// Whether the primary secret material was sealed at construction time.
    pub is_locked: bool,
    /// Whether the key carries no secret material at all.
    pub is_public: bool,
    /// Component identities: the primary first, then subkeys in engine
    /// order.
    pub identities: Vec<KeyIdentity>,
    /// Certified user identities.
    pub user_ids: Vec<String>,
}

impl KeyBlueprint {
    /// Derive a blueprint from a raw engine key. Pure transformation; the
    /// key is not modified.
    ///
    /// The primary's own capabilities are probed on a clone with its
    /// subkeys detached, so a subkey capability can never leak into the
    /// primary's flags. Subkey capabilities and statuses are evaluated
    /// against the primary.
    pub fn from_key<E: CryptoEngine>(engine: &E, key: &E::Key) -> Self {
        let mut identities = Vec::with_capacity(key.subkey_count().saturating_add(1));

        let packet = key.primary_packet();
        let mut probe = key.clone();
        probe.detach_subkeys();
        identities.push(KeyIdentity {
            hash: BASE64.encode(engine.sha256(&packet.canonical)),
            fingerprint: packet.fingerprint,
            can_sign: probe.can_sign(),
            can_encrypt: probe.can_encrypt(),
            status: key.verify_primary(),
            expires_at: key.expiration_time(),
        });

        for index in 0..key.subkey_count() {
            let Some(packet) = key.subkey_packet(index) else {
                continue;
            };
            identities.push(KeyIdentity {
                hash: BASE64.encode(engine.sha256(&packet.canonical)),
                fingerprint: packet.fingerprint,
                can_sign: key.subkey_signing_capable(index),
                can_encrypt: key.subkey_encryption_capable(index),
                status: key.subkey_status(index),
                expires_at: key.subkey_expiration(index),
            });
        }

        Self {
            is_locked: !key.is_unlocked(),
            is_public: key.is_public(),
            identities,
            user_ids: key.user_ids(),
        }
    }

    /// The primary component's identity.
    #[must_use]
    pub fn primary(&self) -> Option<&KeyIdentity> {
        self.identities.first()
    }
}
