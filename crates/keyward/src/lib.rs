//! Keyward - opaque-handle custody for cryptographic keys.
//!
//! Callers generate, unlock, lock, sign, verify, encrypt and decrypt with
//! key material without ever holding a live reference to the sensitive key
//! object. Keys live inside the service; what callers hold are opaque
//! [`Handle`]s and read-only [`ProxyKey`] snapshots.
//!
//! # Lifecycle
//!
//! - A key enters the service through [`KeyService::generate_key`] or
//!   [`KeyService::keys_from_armor`] and comes back as a [`ProxyKey`].
//! - [`KeyService::unlock`] never touches the referenced key: it clones the
//!   material, unseals the clone, and returns a *new* proxy. The original
//!   handle stays valid and locked.
//! - [`KeyService::lock`] is destructive: the referenced key is removed
//!   from the service before the irreversible sealing step, so the old
//!   handle is stale afterwards — success or failure. Keep an armored
//!   backup (see [`KeyService::export_key`]) if you need a recovery path.
//!
//! # Example
//!
//! ```
//! use keyward::{Curve25519Engine, GenerateKeyOpts, KdfParams, KeyService};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rt = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()?;
//! rt.block_on(async {
//!     let service =
//!         KeyService::with_engine(Curve25519Engine::with_kdf_params(KdfParams::interactive()));
//!
//!     let key = service.generate_key("hunter2", GenerateKeyOpts::default()).await?;
//!     assert!(key.is_locked());
//!
//!     let unlocked = service.unlock(&key, "hunter2").await?;
//!     let signed = service.sign(&unlocked, "hello").await?;
//!     let text = service.verify(&unlocked, &signed).await?;
//!     assert_eq!(text, "hello");
//!     Ok::<_, keyward::ServiceError>(())
//! })?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod blueprint;
mod error;
mod live_key;
mod proxy;
mod refs;
mod resolver;
mod service;

pub use blueprint::{KeyBlueprint, KeyIdentity};
pub use error::{ServiceError, ServiceResult};
pub use live_key::{KeyState, LiveKey};
pub use proxy::ProxyKey;
pub use refs::{KeyRef, KeyRefMap, KeyRefs};
pub use resolver::Resolver;
pub use service::{DEFAULT_KEY_SIZE, GenerateKeyOpts, KeyService, ParsedKeys, UserId};

// The collaborator seams, re-exported so most users need a single import.
pub use keyward_cache::{Handle, HandleCache, KeyCache};
pub use keyward_engine::{
    CryptoEngine, Curve25519Engine, Curve25519Key, EngineError, EngineKey, KdfParams,
    VerificationStatus,
};
