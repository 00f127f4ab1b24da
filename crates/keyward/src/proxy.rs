//! The caller-facing key presentation.

use serde::Serialize;

use keyward_cache::Handle;

use crate::blueprint::KeyBlueprint;

/// A safe, read-only view of a cached key: its handle plus its blueprint.
///
/// Carries no key material and is safe to pass around, serialize, or log.
/// Feed it (or just its handle) back into the service to operate on the
/// underlying key.
#[derive(Debug, Clone, Serialize)]
pub struct ProxyKey {
    handle: Handle,
    #[serde(flatten)]
    blueprint: KeyBlueprint,
}

impl ProxyKey {
    pub(crate) fn new(handle: Handle, blueprint: KeyBlueprint) -> Self {
        Self { handle, blueprint }
    }

    /// The opaque handle of the underlying cached key.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The key's blueprint snapshot.
    #[must_use]
    pub fn blueprint(&self) -> &KeyBlueprint {
        &self.blueprint
    }

    /// Whether the underlying key was locked when this proxy was issued.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.blueprint.is_locked
    }

    /// Whether the underlying key is public-only.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.blueprint.is_public
    }

    /// The certified user identities.
    #[must_use]
    pub fn user_ids(&self) -> &[String] {
        &self.blueprint.user_ids
    }
}
