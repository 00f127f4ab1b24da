//! Batch resolution of key references into cached live keys.

use std::marker::PhantomData;

use keyward_cache::KeyCache;
use keyward_engine::EngineKey;

use crate::error::{ServiceError, ServiceResult};
use crate::live_key::{KeyState, LiveKey};
use crate::refs::{KeyRef, KeyRefs};

/// Resolves caller-supplied references against a borrowed cache.
///
/// Resolution is read-only and fail-fast: a batch either resolves
/// completely or fails on the first bad reference, with no partial results
/// and no side effects. The resolver never touches the crypto engine.
pub struct Resolver<'c, K, C> {
    cache: &'c C,
    _key: PhantomData<K>,
}

impl<'c, K, C> Resolver<'c, K, C>
where
    K: EngineKey,
    C: KeyCache<LiveKey<K>>,
{
    /// Wrap a borrowed cache.
    pub fn new(cache: &'c C) -> Self {
        Self {
            cache,
            _key: PhantomData,
        }
    }

    /// Resolve one reference to its cached live key.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidOrStaleReference`] when the handle misses —
    /// whether it was never issued, or its entry has since been removed.
    pub fn resolve_one(&self, key_ref: &KeyRef) -> ServiceResult<&'c LiveKey<K>> {
        self.cache
            .get(key_ref.handle())
            .ok_or(ServiceError::InvalidOrStaleReference)
    }

    /// Resolve a batch of references, in order.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NoKeyReferences`] for an empty batch; otherwise the
    /// first [`ServiceError::InvalidOrStaleReference`] encountered fails
    /// the whole call (already-resolved keys are discarded).
    pub fn resolve_many(&self, refs: &KeyRefs) -> ServiceResult<Vec<&'c LiveKey<K>>> {
        if refs.is_empty() {
            return Err(ServiceError::NoKeyReferences);
        }
        refs.iter().map(|key_ref| self.resolve_one(key_ref)).collect()
    }

    /// Resolve a batch of references that must all be usable private keys.
    ///
    /// # Errors
    ///
    /// As [`Resolver::resolve_many`], plus
    /// [`ServiceError::PrivateKeyNotUnlocked`] when any resolved key is
    /// still locked.
    pub fn resolve_private(&self, refs: &KeyRefs) -> ServiceResult<Vec<&'c LiveKey<K>>> {
        let keys = self.resolve_many(refs)?;
        if keys.iter().any(|key| key.state() == KeyState::Locked) {
            return Err(ServiceError::PrivateKeyNotUnlocked);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_cache::HandleCache;
    use keyward_engine::{CryptoEngine, Curve25519Engine, Curve25519Key, GenerateRequest, KdfParams};

    type Cache = HandleCache<LiveKey<Curve25519Key>>;

    fn engine() -> Curve25519Engine {
        Curve25519Engine::with_kdf_params(KdfParams::interactive())
    }

    fn cache_one(engine: &Curve25519Engine, cache: &mut Cache, unlocked: bool) -> keyward_cache::Handle {
        let key = engine
            .generate_key(&GenerateRequest {
                passphrase: "pw".into(),
                unlocked,
                ..GenerateRequest::default()
            })
            .unwrap();
        cache.set(LiveKey::from_engine_key(engine, key)).unwrap()
    }

    #[test]
    fn test_resolve_one_hits_and_misses() {
        let engine = engine();
        let mut cache = Cache::new();
        let handle = cache_one(&engine, &mut cache, true);

        let resolver = Resolver::new(&cache);
        assert!(resolver.resolve_one(&KeyRef::from(&handle)).is_ok());
        assert!(matches!(
            resolver.resolve_one(&KeyRef::from("stale")),
            Err(ServiceError::InvalidOrStaleReference)
        ));
    }

    #[test]
    fn test_empty_batch_is_rejected() {
        let cache = Cache::new();
        let resolver = Resolver::new(&cache);
        assert!(matches!(
            resolver.resolve_many(&KeyRefs::default()),
            Err(ServiceError::NoKeyReferences)
        ));
    }

    #[test]
    fn test_batch_fails_fast_on_first_stale_reference() {
        let engine = engine();
        let mut cache = Cache::new();
        let valid = cache_one(&engine, &mut cache, true);

        let resolver = Resolver::new(&cache);
        let mut refs = KeyRefs::from("stale-first");
        refs.push(&valid);

        // One bad reference fails the whole batch, valid entries included.
        assert!(matches!(
            resolver.resolve_many(&refs),
            Err(ServiceError::InvalidOrStaleReference)
        ));
    }

    #[test]
    fn test_batch_resolves_in_reference_order() {
        let engine = engine();
        let mut cache = Cache::new();
        let first = cache_one(&engine, &mut cache, true);
        let second = cache_one(&engine, &mut cache, true);

        let resolver = Resolver::new(&cache);
        let mut refs = KeyRefs::from(&first);
        refs.push(&second);

        let resolved = resolver.resolve_many(&refs).unwrap();
        let expected_first = cache.get(&first).unwrap().blueprint().clone();
        assert_eq!(resolved[0].blueprint(), &expected_first);
        assert_eq!(resolved.len(), 2);
    }

    #[test]
    fn test_private_resolution_rejects_locked_keys() {
        let engine = engine();
        let mut cache = Cache::new();
        let unlocked = cache_one(&engine, &mut cache, true);
        let locked = cache_one(&engine, &mut cache, false);

        let resolver = Resolver::new(&cache);

        let mut mixed = KeyRefs::from(&unlocked);
        mixed.push(&locked);
        assert!(matches!(
            resolver.resolve_private(&mixed),
            Err(ServiceError::PrivateKeyNotUnlocked)
        ));

        let fine = KeyRefs::from(&unlocked);
        assert_eq!(resolver.resolve_private(&fine).unwrap().len(), 1);
    }
}
