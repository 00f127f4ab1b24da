//! Keyward Cache - opaque-handle storage for sensitive values.
//!
//! This crate provides:
//! - [`Handle`], an unguessable, semantically empty token identifying one
//!   stored value
//! - The [`KeyCache`] trait, the storage seam consumed by the Keyward
//!   service orchestrator
//! - [`HandleCache`], the built-in in-memory implementation
//!
//! Values are inserted, looked up, and removed exclusively through handles.
//! A handle that has been removed (or never existed) simply misses; the
//! store never reports why.
//!
//! # Example
//!
//! ```
//! use keyward_cache::{HandleCache, KeyCache};
//!
//! let mut cache = HandleCache::new();
//! let handle = cache.set("sensitive value").unwrap();
//!
//! assert!(cache.has(&handle));
//! assert_eq!(cache.get(&handle), Some(&"sensitive value"));
//!
//! cache.del(&handle);
//! assert!(!cache.has(&handle));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cache;
mod handle;

pub use cache::{HandleCache, KeyCache};
pub use handle::Handle;
