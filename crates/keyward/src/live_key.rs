//! The live key: a stateful wrapper around one raw engine key.

use keyward_engine::{CryptoEngine, EngineKey};

use crate::blueprint::KeyBlueprint;
use crate::error::{ServiceError, ServiceResult};

/// The lifecycle state of a live key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Secret material is clear; private operations are available.
    Unlocked,
    /// Secret material is sealed (or absent, for public keys).
    Locked,
}

/// A live key: exactly one raw engine key plus its current blueprint.
///
/// Read operations (`armor`, `sign`, `verify`) never change state.
/// [`unlock`](LiveKey::unlock) operates on an independent clone and leaves
/// its receiver untouched. [`lock`](LiveKey::lock) is the one destructive
/// operation: it takes the key by value, so a locked-away receiver cannot
/// be used again — the compiler enforces the terminal state.
///
/// No two `LiveKey` values ever alias the same engine key: construction
/// takes the engine key by value, and every lifecycle operation yields a
/// brand-new `LiveKey` over fresh or moved material.
#[derive(Debug)]
pub struct LiveKey<K: EngineKey> {
    key: K,
    blueprint: KeyBlueprint,
}

impl<K: EngineKey> LiveKey<K> {
    /// Wrap a raw engine key, deriving its blueprint.
    pub fn from_engine_key<E>(engine: &E, key: K) -> Self
    where
        E: CryptoEngine<Key = K>,
    {
        let blueprint = KeyBlueprint::from_key(engine, &key);
        Self { key, blueprint }
    }

    /// The key's blueprint.
    #[must_use]
    pub fn blueprint(&self) -> &KeyBlueprint {
        &self.blueprint
    }

    /// The raw engine key. Never leaves this crate.
    pub(crate) fn engine_key(&self) -> &K {
        &self.key
    }

    /// Current lifecycle state, as recorded by the blueprint.
    #[must_use]
    pub fn state(&self) -> KeyState {
        if self.blueprint.is_locked {
            KeyState::Locked
        } else {
            KeyState::Unlocked
        }
    }

    /// Serialize the key to armored text. No state change.
    ///
    /// # Errors
    ///
    /// Propagates engine encoding failures.
    pub fn armor(&self) -> ServiceResult<String> {
        Ok(self.key.armor()?)
    }

    /// Produce a new, unlocked `LiveKey` from this one.
    ///
    /// The receiver is never mutated: the engine key is cloned and the
    /// clone unsealed, so the original remains cached and usable.
    ///
    /// # Errors
    ///
    /// [`ServiceError::KeyNotLocked`] when this key is already unlocked;
    /// [`ServiceError::UnlockFailed`] when the passphrase does not open the
    /// seals.
    pub fn unlock<E>(&self, engine: &E, passphrase: &str) -> ServiceResult<Self>
    where
        E: CryptoEngine<Key = K>,
    {
        if !self.blueprint.is_locked {
            return Err(ServiceError::KeyNotLocked);
        }
        let mut clone = self.key.clone();
        if clone.unlock_material(passphrase)? {
            Ok(Self::from_engine_key(engine, clone))
        } else {
            Err(ServiceError::UnlockFailed)
        }
    }

    /// Seal this key's material under `passphrase`, consuming the receiver.
    ///
    /// The sealing is an in-place, irreversible mutation of the engine key,
    /// so the receiver is taken by value: whatever the outcome, the old
    /// value is gone. On success the now-sealed key returns as a new
    /// `LiveKey`; on engine failure the material is in an undefined state
    /// and nothing is returned.
    ///
    /// # Errors
    ///
    /// [`ServiceError::KeyNotUnlocked`] when this key is not unlocked, or
    /// the engine's sealing error.
    pub fn lock<E>(self, engine: &E, passphrase: &str) -> ServiceResult<Self>
    where
        E: CryptoEngine<Key = K>,
    {
        if self.blueprint.is_locked {
            return Err(ServiceError::KeyNotUnlocked);
        }
        let mut key = self.key;
        key.lock_material(passphrase)?;
        Ok(Self::from_engine_key(engine, key))
    }

    /// Sign `text` with this key, returning armored signed text.
    ///
    /// # Errors
    ///
    /// Propagates the engine's error when the key is sealed, public, or not
    /// signing-capable.
    pub fn sign<E>(&self, engine: &E, text: &str) -> ServiceResult<String>
    where
        E: CryptoEngine<Key = K>,
    {
        Ok(engine.sign_text(&[&self.key], text)?)
    }

    /// Check an armored signed message against this key.
    ///
    /// Returns the recovered text when the message's signature validates
    /// against this key, and `None` otherwise — a failed check on a single
    /// key is a negative result, not an error.
    ///
    /// # Errors
    ///
    /// Propagates engine errors for malformed armor.
    pub fn verify<E>(&self, engine: &E, armor: &str) -> ServiceResult<Option<String>>
    where
        E: CryptoEngine<Key = K>,
    {
        let verified = engine.verify_armored(&[&self.key], armor)?;
        let valid = verified.checks.first().is_some_and(|check| check.valid);
        Ok(valid.then_some(verified.text))
    }
}
