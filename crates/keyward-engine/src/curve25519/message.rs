//! Signed and encrypted message envelopes.

use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::error::{EngineError, EngineResult};

use super::material::{aead_open, aead_seal};

/// Domain separator for text signatures.
const MSG_CONTEXT: &[u8] = b"keyward-msg-v1\0";
/// HKDF info string for session-key wrapping.
const WRAP_INFO: &[u8] = b"keyward-wrap-v1";

/// A cleartext message carrying one signature per signing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SignedMessage {
    pub(crate) text: String,
    pub(crate) signatures: Vec<MessageSignature>,
}

/// One detached signature over the message text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct MessageSignature {
    /// Short id of the signing key's primary.
    pub(crate) key_id: String,
    /// Base64 Ed25519 signature bytes.
    pub(crate) signature: String,
}

/// An encrypted message: a sealed [`SignedMessage`] plus one session-key
/// stanza per recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SealedEnvelope {
    pub(crate) recipients: Vec<RecipientStanza>,
    pub(crate) nonce: Vec<u8>,
    pub(crate) ciphertext: Vec<u8>,
}

/// The session key wrapped for one recipient subkey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RecipientStanza {
    /// Short id of the recipient's encryption subkey.
    pub(crate) key_id: String,
    /// Ephemeral X25519 public key bytes.
    pub(crate) ephemeral: Vec<u8>,
    pub(crate) nonce: Vec<u8>,
    pub(crate) wrapped_key: Vec<u8>,
}

/// The byte string a text signature covers.
pub(crate) fn message_signing_bytes(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MSG_CONTEXT);
    out.extend_from_slice(text.as_bytes());
    out
}

/// Derive the session-key wrap key from an X25519 shared secret.
fn wrap_key(shared_secret: &[u8; 32], ephemeral_public: &[u8]) -> EngineResult<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(Some(ephemeral_public), shared_secret);
    let mut okm = [0u8; 32];
    hk.expand(WRAP_INFO, &mut okm)
        .map_err(|e| EngineError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}

/// Wrap `session_key` for a recipient given the ECDH shared secret.
pub(crate) fn wrap_session_key(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8],
    session_key: &[u8; 32],
) -> EngineResult<(Vec<u8>, Vec<u8>)> {
    let mut kek = wrap_key(shared_secret, ephemeral_public)?;
    let sealed = aead_seal(&kek, session_key);
    kek.zeroize();
    sealed
}

/// Recover a wrapped session key. `None` means the stanza does not open
/// under this shared secret.
pub(crate) fn unwrap_session_key(
    shared_secret: &[u8; 32],
    stanza: &RecipientStanza,
) -> EngineResult<Option<[u8; 32]>> {
    let mut kek = wrap_key(shared_secret, &stanza.ephemeral)?;
    let opened = aead_open(&kek, &stanza.nonce, &stanza.wrapped_key);
    kek.zeroize();

    match opened? {
        Some(mut bytes) => {
            if bytes.len() != 32 {
                return Err(EngineError::Encoding("bad session key length".into()));
            }
            let mut key = [0u8; 32];
            key.copy_from_slice(&bytes);
            bytes.zeroize();
            Ok(Some(key))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_unwrap_session_key() {
        let shared = [5u8; 32];
        let ephemeral = [6u8; 32];
        let session = [7u8; 32];

        let (nonce, wrapped) = wrap_session_key(&shared, &ephemeral, &session).unwrap();
        let stanza = RecipientStanza {
            key_id: "id".into(),
            ephemeral: ephemeral.to_vec(),
            nonce,
            wrapped_key: wrapped,
        };

        assert_eq!(unwrap_session_key(&shared, &stanza).unwrap(), Some(session));

        let wrong_shared = [9u8; 32];
        assert_eq!(unwrap_session_key(&wrong_shared, &stanza).unwrap(), None);
    }

    #[test]
    fn test_signing_bytes_are_domain_separated() {
        assert_ne!(message_signing_bytes("a"), message_signing_bytes("b"));
        assert!(message_signing_bytes("a").starts_with(MSG_CONTEXT));
    }
}
