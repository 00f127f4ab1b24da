//! Key components, canonical serialization, and passphrase sealing.

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{EngineError, EngineResult};

/// Algorithm tag of the signing primary.
pub(crate) const ALG_SIGN: &str = "ed25519";
/// Algorithm tag of the encryption subkey.
pub(crate) const ALG_ENCRYPT: &str = "x25519";

/// Secret scalar length for both curves.
pub(crate) const SECRET_LEN: usize = 32;
/// Salt length for passphrase key derivation.
const SALT_LEN: usize = 16;
/// ChaCha20-Poly1305 nonce length.
pub(crate) const NONCE_LEN: usize = 12;

/// Argon2id cost parameters for passphrase sealing.
///
/// Each sealed secret records the parameters it was sealed under, so keys
/// sealed with one cost profile unseal correctly in a process configured
/// with another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub passes: u32,
    /// Degree of parallelism.
    pub lanes: u32,
}

impl KdfParams {
    /// Hardened profile for long-lived key storage (64 MiB, 3 passes,
    /// 4 lanes).
    #[must_use]
    pub const fn hardened() -> Self {
        Self {
            memory_kib: 65536,
            passes: 3,
            lanes: 4,
        }
    }

    /// Lighter profile for interactive use and tests (8 MiB, 2 passes,
    /// 1 lane).
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            memory_kib: 8192,
            passes: 2,
            lanes: 1,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::hardened()
    }
}

/// Derive a 256-bit sealing key from a passphrase.
fn derive_seal_key(passphrase: &str, salt: &[u8], kdf: KdfParams) -> EngineResult<[u8; 32]> {
    let params = Params::new(kdf.memory_kib, kdf.passes, kdf.lanes, Some(32))
        .map_err(|e| EngineError::KeyDerivation(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| EngineError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Encrypt `plain` under `key` with a fresh random nonce.
///
/// Returns the nonce and ciphertext.
pub(crate) fn aead_seal(key: &[u8; 32], plain: &[u8]) -> EngineResult<(Vec<u8>, Vec<u8>)> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plain)
        .map_err(|_| EngineError::SealFailure)?;
    Ok((nonce.to_vec(), ciphertext))
}

/// Decrypt `ciphertext` under `key` and `nonce`.
///
/// `None` means the seal did not open (wrong key or tampered data).
pub(crate) fn aead_open(key: &[u8; 32], nonce: &[u8], ciphertext: &[u8]) -> EngineResult<Option<Vec<u8>>> {
    if nonce.len() != NONCE_LEN {
        return Err(EngineError::Encoding("bad nonce length".into()));
    }
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    Ok(cipher.decrypt(Nonce::from_slice(nonce), ciphertext).ok())
}

/// Clear (usable) secret scalar bytes, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
pub(crate) struct ClearSecret(pub(crate) Vec<u8>);

impl std::fmt::Debug for ClearSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClearSecret(..)")
    }
}

/// Passphrase-sealed secret scalar bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SealedSecret {
    pub(crate) kdf: KdfParams,
    pub(crate) salt: Vec<u8>,
    pub(crate) nonce: Vec<u8>,
    pub(crate) ciphertext: Vec<u8>,
}

/// The secret half of one key component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum SecretMaterial {
    /// No secret at all: the component is public.
    None,
    /// Clear, usable secret bytes.
    Clear(ClearSecret),
    /// Secret bytes sealed under a passphrase.
    Sealed(SealedSecret),
}

impl SecretMaterial {
    pub(crate) fn is_clear(&self) -> bool {
        matches!(self, Self::Clear(_))
    }

    pub(crate) fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Clear secret bytes, if the material is currently clear.
    pub(crate) fn clear_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Clear(c) => Some(&c.0),
            _ => None,
        }
    }

    /// Seal clear material in place. Returns whether anything was sealed.
    pub(crate) fn seal(&mut self, passphrase: &str, kdf: KdfParams) -> EngineResult<bool> {
        let Self::Clear(clear) = self else {
            return Ok(false);
        };

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let mut key = derive_seal_key(passphrase, &salt, kdf)?;
        let sealed = aead_seal(&key, &clear.0);
        key.zeroize();
        let (nonce, ciphertext) = sealed?;

        *self = Self::Sealed(SealedSecret {
            kdf,
            salt: salt.to_vec(),
            nonce,
            ciphertext,
        });
        Ok(true)
    }

    /// Unseal sealed material in place.
    ///
    /// Returns `Ok(false)` when the passphrase does not open the seal;
    /// material that is already clear (or absent) is left untouched and
    /// does not count as a failure.
    pub(crate) fn unseal(&mut self, passphrase: &str) -> EngineResult<bool> {
        let Self::Sealed(sealed) = self else {
            return Ok(true);
        };

        let mut key = derive_seal_key(passphrase, &sealed.salt, sealed.kdf)?;
        let opened = aead_open(&key, &sealed.nonce, &sealed.ciphertext);
        key.zeroize();

        match opened? {
            Some(plain) => {
                if plain.len() != SECRET_LEN {
                    return Err(EngineError::Encoding("bad secret length".into()));
                }
                *self = Self::Clear(ClearSecret(plain));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// The signing primary component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PrimaryComponent {
    /// Ed25519 verifying key bytes.
    pub(crate) public: Vec<u8>,
    pub(crate) secret: SecretMaterial,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) expires_at: Option<DateTime<Utc>>,
    /// Self-signature over the certification message.
    pub(crate) certification: Vec<u8>,
}

/// An encryption subkey component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SubkeyComponent {
    /// X25519 public key bytes.
    pub(crate) public: Vec<u8>,
    pub(crate) secret: SecretMaterial,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) expires_at: Option<DateTime<Utc>>,
    /// Primary signature over the binding message.
    pub(crate) binding: Vec<u8>,
}

/// Deterministic serialization of a component's public fields:
/// `algorithm \0 public-bytes created-millis(8) expires-millis(8)`,
/// timestamps big-endian, `i64::MIN` standing for "never expires".
pub(crate) fn canonical_bytes(
    algorithm: &str,
    public: &[u8],
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(algorithm.as_bytes());
    out.push(0);
    out.extend_from_slice(public);
    out.extend_from_slice(&created_at.timestamp_millis().to_be_bytes());
    let expires = expires_at.map_or(i64::MIN, |t| t.timestamp_millis());
    out.extend_from_slice(&expires.to_be_bytes());
    out
}

/// Hex fingerprint of a canonical component serialization.
pub(crate) fn fingerprint(canonical: &[u8]) -> String {
    hex::encode(Sha256::digest(canonical))
}

/// The byte string certified by the primary self-signature.
pub(crate) fn certification_message(primary_canonical: &[u8], user_ids: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"keyward-cert-v1\0");
    out.extend_from_slice(primary_canonical);
    for id in user_ids {
        out.extend_from_slice(id.as_bytes());
        out.push(0);
    }
    out
}

/// The byte string signed by the primary to bind a subkey.
pub(crate) fn binding_message(primary_fingerprint: &str, subkey_canonical: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"keyward-bind-v1\0");
    out.extend_from_slice(primary_fingerprint.as_bytes());
    out.push(0);
    out.extend_from_slice(subkey_canonical);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear(bytes: [u8; 32]) -> SecretMaterial {
        SecretMaterial::Clear(ClearSecret(bytes.to_vec()))
    }

    #[test]
    fn test_seal_then_unseal_round_trips() {
        let mut material = clear([7u8; 32]);
        assert!(material.seal("pass", KdfParams::interactive()).unwrap());
        assert!(!material.is_clear());

        assert!(material.unseal("pass").unwrap());
        assert_eq!(material.clear_bytes(), Some(&[7u8; 32][..]));
    }

    #[test]
    fn test_unseal_with_wrong_passphrase_reports_false() {
        let mut material = clear([9u8; 32]);
        material.seal("right", KdfParams::interactive()).unwrap();

        assert!(!material.unseal("wrong").unwrap());
        assert!(!material.is_clear());
    }

    #[test]
    fn test_sealing_public_material_is_a_no_op() {
        let mut material = SecretMaterial::None;
        assert!(!material.seal("pass", KdfParams::interactive()).unwrap());
        assert!(material.is_none());
    }

    #[test]
    fn test_canonical_bytes_are_deterministic() {
        let created = Utc::now();
        let a = canonical_bytes(ALG_SIGN, &[1u8; 32], created, None);
        let b = canonical_bytes(ALG_SIGN, &[1u8; 32], created, None);
        assert_eq!(a, b);

        let c = canonical_bytes(ALG_ENCRYPT, &[1u8; 32], created, None);
        assert_ne!(a, c);
    }

    #[test]
    fn test_expiry_changes_the_fingerprint() {
        let created = Utc::now();
        let never = canonical_bytes(ALG_SIGN, &[2u8; 32], created, None);
        let dated = canonical_bytes(ALG_SIGN, &[2u8; 32], created, Some(created));
        assert_ne!(fingerprint(&never), fingerprint(&dated));
    }

    #[test]
    fn test_aead_open_rejects_tampered_ciphertext() {
        let key = [3u8; 32];
        let (nonce, mut ciphertext) = aead_seal(&key, b"payload").unwrap();
        ciphertext[0] ^= 0xFF;
        assert!(aead_open(&key, &nonce, &ciphertext).unwrap().is_none());
    }
}
