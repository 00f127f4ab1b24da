//! Service error types.

use thiserror::Error;

use keyward_engine::EngineError;

/// Errors surfaced by the [`KeyService`](crate::KeyService) façade.
///
/// Every failure is per-call: it rejects the in-flight operation and leaves
/// shared state untouched, with one documented exception — a failed
/// consuming [`lock`](crate::KeyService::lock) has already invalidated the
/// referenced key.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A primitive string argument was empty. Reported before any cache or
    /// engine access.
    #[error("invalid {what}: empty string")]
    InvalidArgument {
        /// Which argument was rejected.
        what: &'static str,
    },

    /// A key reference did not resolve: the handle was never issued, or its
    /// entry has been removed.
    #[error("invalid or stale key reference")]
    InvalidOrStaleReference,

    /// An operation was given an empty reference batch.
    #[error("no key references")]
    NoKeyReferences,

    /// A private-key operation resolved a key that is still locked.
    #[error("private key not unlocked")]
    PrivateKeyNotUnlocked,

    /// `unlock` was called on a key that is not locked.
    #[error("key not locked")]
    KeyNotLocked,

    /// `lock` was called on a key that is not unlocked.
    #[error("key not unlocked")]
    KeyNotUnlocked,

    /// The passphrase did not unlock the key.
    #[error("failed to unlock key")]
    UnlockFailed,

    /// The cache declined to store a new live key.
    #[error("failed to cache key")]
    CacheInsertFailed,

    /// Signature verification failed for one or more resolved keys.
    #[error("authentication failed: {key_ids}")]
    AuthenticationFailed {
        /// Comma-joined ids of the failing keys, in resolution order.
        key_ids: String,
    },

    /// An error from the crypto engine, propagated unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
