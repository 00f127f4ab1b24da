//! Prelude module - commonly used types for convenient import.
//!
//! Use `use keyward::prelude::*;` to import the whole service surface.
//!
//! # Example
//!
//! ```rust
//! use keyward::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rt = tokio::runtime::Builder::new_current_thread()
//!     .enable_all()
//!     .build()?;
//! rt.block_on(async {
//!     let service =
//!         KeyService::with_engine(Curve25519Engine::with_kdf_params(KdfParams::interactive()));
//!     let key = service.generate_key("hunter2", GenerateKeyOpts::default()).await?;
//!     assert!(key.is_locked());
//!     Ok::<_, ServiceError>(())
//! })?;
//! # Ok(())
//! # }
//! ```

// Errors
pub use crate::{ServiceError, ServiceResult};

// The service façade and its option types
pub use crate::{DEFAULT_KEY_SIZE, GenerateKeyOpts, KeyService, ParsedKeys, UserId};

// References and presentation types
pub use crate::{KeyBlueprint, KeyIdentity, KeyRef, KeyRefMap, KeyRefs, ProxyKey};

// Collaborator seams
pub use crate::{
    CryptoEngine, Curve25519Engine, EngineKey, Handle, HandleCache, KdfParams, KeyCache,
};
