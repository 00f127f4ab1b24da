//! The service façade: every caller-visible operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use keyward_cache::{HandleCache, KeyCache};
use keyward_engine::{CryptoEngine, Curve25519Engine, GenerateRequest};

use crate::error::{ServiceError, ServiceResult};
use crate::live_key::{KeyState, LiveKey};
use crate::proxy::ProxyKey;
use crate::refs::{KeyRef, KeyRefMap, KeyRefs};
use crate::resolver::Resolver;

/// Default advisory key strength, in bits.
pub const DEFAULT_KEY_SIZE: u32 = 4096;

/// One user identity to certify into a generated key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId {
    /// Display name, if any.
    pub name: Option<String>,
    /// Email address.
    pub email: String,
}

impl UserId {
    /// Identity with an email address only.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            name: None,
            email: email.into(),
        }
    }

    /// Identity with a display name and an email address.
    pub fn with_name(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
        }
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

impl From<&str> for UserId {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

/// Options for [`KeyService::generate_key`].
#[derive(Debug, Clone)]
pub struct GenerateKeyOpts {
    /// User identities to certify into the key.
    pub users: Vec<UserId>,
    /// Advisory key strength in bits; fixed-strength engines ignore it.
    pub size: u32,
    /// Leave the generated key unlocked instead of sealing it under the
    /// passphrase.
    pub unlocked: bool,
    /// Expiration time; `None` generates a non-expiring key.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Default for GenerateKeyOpts {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            size: DEFAULT_KEY_SIZE,
            unlocked: false,
            expires_at: None,
        }
    }
}

/// The keys parsed out of one armored block.
///
/// A block holding exactly one key yields the proxy directly; anything
/// else yields the full sequence in parse order.
#[derive(Debug, Clone, Serialize)]
pub enum ParsedKeys {
    /// The block held exactly one key.
    One(ProxyKey),
    /// The block held zero or several keys, in parse order.
    Many(Vec<ProxyKey>),
}

impl ParsedKeys {
    /// Number of parsed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(keys) => keys.len(),
        }
    }

    /// Whether no keys were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single parsed key, if there was exactly one.
    #[must_use]
    pub fn single(self) -> Option<ProxyKey> {
        match self {
            Self::One(key) => Some(key),
            Self::Many(_) => None,
        }
    }

    /// All parsed keys, in parse order.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProxyKey> {
        match self {
            Self::One(key) => vec![key],
            Self::Many(keys) => keys,
        }
    }
}

fn non_empty(value: &str, what: &'static str) -> ServiceResult<()> {
    if value.is_empty() {
        Err(ServiceError::InvalidArgument { what })
    } else {
        Ok(())
    }
}

/// The key custody service.
///
/// Composes the crypto engine, the handle cache, the reference resolver,
/// and the live-key lifecycle into the caller-facing façade. Both
/// collaborators are injected at construction and default to the
/// built-ins; there is no hidden global state.
///
/// Every operation runs under one internal lock over the cache, so the
/// check-then-invalidate-then-mutate sequence of [`lock`](Self::lock) and
/// the get-then-use sequence of resolution never interleave with another
/// operation on the same handle.
pub struct KeyService<E = Curve25519Engine, C = HandleCache<LiveKey<<E as CryptoEngine>::Key>>>
where
    E: CryptoEngine,
    C: KeyCache<LiveKey<E::Key>>,
{
    engine: E,
    cache: Mutex<C>,
}

impl KeyService {
    /// Service over the built-in engine and cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(Curve25519Engine::new())
    }
}

impl Default for KeyService {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CryptoEngine> KeyService<E> {
    /// Service over a custom engine and the built-in cache.
    pub fn with_engine(engine: E) -> Self {
        Self::with_parts(engine, HandleCache::new())
    }
}

impl<E, C> KeyService<E, C>
where
    E: CryptoEngine,
    C: KeyCache<LiveKey<E::Key>>,
{
    /// Service over a custom engine and a custom cache.
    pub fn with_parts(engine: E, cache: C) -> Self {
        Self {
            engine,
            cache: Mutex::new(cache),
        }
    }

    /// Generate a new key pair sealed under `passphrase`, cache it, and
    /// return its proxy.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidArgument`] for an empty passphrase (checked
    /// before any cache or engine access), [`ServiceError::CacheInsertFailed`]
    /// when the cache declines the key, or any engine generation error.
    pub async fn generate_key(
        &self,
        passphrase: &str,
        opts: GenerateKeyOpts,
    ) -> ServiceResult<ProxyKey> {
        non_empty(passphrase, "passphrase")?;
        let request = GenerateRequest {
            user_ids: opts.users.iter().map(ToString::to_string).collect(),
            passphrase: passphrase.to_owned(),
            size: opts.size,
            unlocked: opts.unlocked,
            expires_at: opts.expires_at,
        };
        let key = self.engine.generate_key(&request)?;
        let live = LiveKey::from_engine_key(&self.engine, key);

        let mut cache = self.cache.lock().await;
        self.cache_and_proxy(&mut cache, live)
    }

    /// Parse every key out of one armored block, cache each, and return
    /// their proxies in parse order.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidArgument`] for empty armor, or any engine
    /// parse error.
    pub async fn keys_from_armor(&self, armor: &str) -> ServiceResult<ParsedKeys> {
        non_empty(armor, "armor")?;
        let keys = self.engine.read_armored_keys(armor)?;

        let mut cache = self.cache.lock().await;
        let mut proxies = Vec::with_capacity(keys.len());
        for key in keys {
            let live = LiveKey::from_engine_key(&self.engine, key);
            proxies.push(self.cache_and_proxy(&mut cache, live)?);
        }
        if proxies.len() == 1 {
            let proxy = proxies.remove(0);
            return Ok(ParsedKeys::One(proxy));
        }
        Ok(ParsedKeys::Many(proxies))
    }

    /// Produce an unlocked copy of the referenced key under a new handle.
    ///
    /// The referenced key is never mutated: after this call the original
    /// handle still resolves (and is still locked) while the new handle
    /// resolves unlocked.
    ///
    /// # Errors
    ///
    /// [`ServiceError::KeyNotLocked`] when the referenced key is already
    /// unlocked, [`ServiceError::UnlockFailed`] for a wrong passphrase,
    /// plus the usual argument/reference/cache failures.
    pub async fn unlock(
        &self,
        key_ref: impl Into<KeyRef>,
        passphrase: &str,
    ) -> ServiceResult<ProxyKey> {
        non_empty(passphrase, "passphrase")?;
        let key_ref = key_ref.into();

        let mut cache = self.cache.lock().await;
        let unlocked = {
            let resolver = Resolver::new(&*cache);
            let live = resolver.resolve_one(&key_ref)?;
            live.unlock(&self.engine, passphrase)?
        };
        self.cache_and_proxy(&mut cache, unlocked)
    }

    /// Seal the referenced key under `passphrase`, invalidating it.
    ///
    /// The referenced entry leaves the cache *before* the destructive
    /// engine call, so the old handle is stale afterwards whatever the
    /// outcome. On success the sealed key is cached under a new handle and
    /// its proxy returned; on engine failure nothing remains cached for
    /// either the old or the new key.
    ///
    /// # Errors
    ///
    /// [`ServiceError::KeyNotUnlocked`] when the referenced key is not
    /// unlocked (reported without invalidating anything), plus the usual
    /// argument/reference/cache failures and engine sealing errors.
    pub async fn lock(
        &self,
        key_ref: impl Into<KeyRef>,
        passphrase: &str,
    ) -> ServiceResult<ProxyKey> {
        non_empty(passphrase, "passphrase")?;
        let key_ref = key_ref.into();

        let mut cache = self.cache.lock().await;
        {
            let resolver = Resolver::new(&*cache);
            let live = resolver.resolve_one(&key_ref)?;
            if live.state() == KeyState::Locked {
                // Reject before invalidating anything.
                return Err(ServiceError::KeyNotUnlocked);
            }
        }

        let handle = key_ref.handle().clone();
        let live = cache
            .del(&handle)
            .ok_or(ServiceError::InvalidOrStaleReference)?;
        tracing::debug!(%handle, "removed live key ahead of consuming lock");

        let locked = match live.lock(&self.engine, passphrase) {
            Ok(locked) => locked,
            Err(e) => {
                tracing::warn!(%handle, "engine failure during lock; key consumed");
                return Err(e);
            }
        };
        self.cache_and_proxy(&mut cache, locked)
    }

    /// Sign `plain` with the private `auth` keys and encrypt it to the
    /// `cipher` keys, returning armored cipher text.
    ///
    /// # Errors
    ///
    /// [`ServiceError::PrivateKeyNotUnlocked`] when a signing key is still
    /// locked, plus the usual argument/reference failures and engine
    /// errors.
    pub async fn encrypt(&self, key_refs: KeyRefMap, plain: &str) -> ServiceResult<String> {
        non_empty(plain, "plain text")?;

        let cache = self.cache.lock().await;
        let resolver = Resolver::new(&*cache);
        let signing = resolver.resolve_private(&key_refs.auth)?;
        let recipients = resolver.resolve_many(&key_refs.cipher)?;

        let signing_keys: Vec<&E::Key> = signing.iter().map(|l| l.engine_key()).collect();
        let recipient_keys: Vec<&E::Key> = recipients.iter().map(|l| l.engine_key()).collect();
        Ok(self
            .engine
            .encrypt_and_sign(&signing_keys, &recipient_keys, plain)?)
    }

    /// Decrypt armored cipher text with the first private `cipher` key and
    /// verify the embedded signatures against the `auth` keys.
    ///
    /// # Errors
    ///
    /// [`ServiceError::PrivateKeyNotUnlocked`] when the decryption key is
    /// still locked, plus the usual argument/reference failures and engine
    /// errors (including failed verification).
    pub async fn decrypt(&self, key_refs: KeyRefMap, cipher: &str) -> ServiceResult<String> {
        non_empty(cipher, "cipher text")?;

        let cache = self.cache.lock().await;
        let resolver = Resolver::new(&*cache);
        let deciphering = resolver.resolve_private(&key_refs.cipher)?;
        let verification = resolver.resolve_many(&key_refs.auth)?;

        let decryption_key = deciphering
            .first()
            .map(|l| l.engine_key())
            .ok_or(ServiceError::NoKeyReferences)?;
        let verification_keys: Vec<&E::Key> = verification.iter().map(|l| l.engine_key()).collect();
        Ok(self
            .engine
            .decrypt_and_verify(decryption_key, &verification_keys, cipher)?)
    }

    /// Sign `text` with the referenced private keys, returning armored
    /// signed text.
    ///
    /// # Errors
    ///
    /// [`ServiceError::PrivateKeyNotUnlocked`] when a referenced key is
    /// still locked, plus the usual argument/reference failures and engine
    /// errors.
    pub async fn sign(&self, key_refs: impl Into<KeyRefs>, text: &str) -> ServiceResult<String> {
        non_empty(text, "text")?;
        let key_refs = key_refs.into();

        let cache = self.cache.lock().await;
        let resolver = Resolver::new(&*cache);
        let keys = resolver.resolve_private(&key_refs)?;

        let engine_keys: Vec<&E::Key> = keys.iter().map(|l| l.engine_key()).collect();
        Ok(self.engine.sign_text(&engine_keys, text)?)
    }

    /// Verify armored signed text against the referenced keys and return
    /// the recovered plain text.
    ///
    /// # Errors
    ///
    /// [`ServiceError::AuthenticationFailed`] when any resolved key fails
    /// its signature check — the message enumerates the failing key ids,
    /// comma-joined, in resolution order — plus the usual
    /// argument/reference failures and engine errors.
    pub async fn verify(&self, key_refs: impl Into<KeyRefs>, armor: &str) -> ServiceResult<String> {
        non_empty(armor, "armor")?;
        let key_refs = key_refs.into();

        let cache = self.cache.lock().await;
        let resolver = Resolver::new(&*cache);
        let keys = resolver.resolve_many(&key_refs)?;

        let engine_keys: Vec<&E::Key> = keys.iter().map(|l| l.engine_key()).collect();
        let verified = self.engine.verify_armored(&engine_keys, armor)?;

        let failing: Vec<&str> = verified
            .checks
            .iter()
            .filter(|check| !check.valid)
            .map(|check| check.key_id.as_str())
            .collect();
        if failing.is_empty() {
            Ok(verified.text)
        } else {
            Err(ServiceError::AuthenticationFailed {
                key_ids: failing.join(","),
            })
        }
    }

    /// Export the referenced key as armored text. Read-only; the exported
    /// backup is the recovery path for keys later consumed by
    /// [`lock`](Self::lock).
    ///
    /// # Errors
    ///
    /// The usual reference failures, or an engine encoding error.
    pub async fn export_key(&self, key_ref: impl Into<KeyRef>) -> ServiceResult<String> {
        let key_ref = key_ref.into();

        let cache = self.cache.lock().await;
        let resolver = Resolver::new(&*cache);
        resolver.resolve_one(&key_ref)?.armor()
    }

    fn cache_and_proxy(&self, cache: &mut C, live: LiveKey<E::Key>) -> ServiceResult<ProxyKey> {
        let blueprint = live.blueprint().clone();
        let handle = cache.set(live).ok_or(ServiceError::CacheInsertFailed)?;
        tracing::debug!(%handle, "cached live key");
        Ok(ProxyKey::new(handle, blueprint))
    }
}
