//! The cache seam and its built-in in-memory implementation.

use std::collections::HashMap;

use crate::handle::Handle;

/// Handle-indexed storage for sensitive values.
///
/// This is the storage seam of the Keyward service: the orchestrator only
/// ever files values away under freshly minted handles and retrieves or
/// removes them by handle. Implementations decide retention; the built-in
/// [`HandleCache`] keeps entries until they are explicitly deleted.
pub trait KeyCache<V>: Send + 'static {
    /// Store a value, minting a new handle for it.
    ///
    /// Returns `None` when the store declines the value (for example when a
    /// configured capacity limit is reached).
    fn set(&mut self, value: V) -> Option<Handle>;

    /// Look up the value stored under `handle`.
    fn get(&self, handle: &Handle) -> Option<&V>;

    /// Remove and return the value stored under `handle`.
    fn del(&mut self, handle: &Handle) -> Option<V>;

    /// Whether `handle` currently maps to a stored value.
    fn has(&self, handle: &Handle) -> bool;
}

/// In-memory handle store.
///
/// Unbounded by default; [`HandleCache::with_capacity_limit`] configures a
/// maximum entry count past which [`KeyCache::set`] declines new values.
#[derive(Debug, Default)]
pub struct HandleCache<V> {
    entries: HashMap<Handle, V>,
    capacity_limit: Option<usize>,
}

impl<V> HandleCache<V> {
    /// Create an empty, unbounded cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            capacity_limit: None,
        }
    }

    /// Create an empty cache that declines inserts beyond `limit` entries.
    #[must_use]
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity_limit: Some(limit),
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Send + 'static> KeyCache<V> for HandleCache<V> {
    fn set(&mut self, value: V) -> Option<Handle> {
        if self
            .capacity_limit
            .is_some_and(|limit| self.entries.len() >= limit)
        {
            return None;
        }
        let handle = Handle::mint();
        self.entries.insert(handle.clone(), value);
        Some(handle)
    }

    fn get(&self, handle: &Handle) -> Option<&V> {
        self.entries.get(handle)
    }

    fn del(&mut self, handle: &Handle) -> Option<V> {
        self.entries.remove(handle)
    }

    fn has(&self, handle: &Handle) -> bool {
        self.entries.contains_key(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_del() {
        let mut cache = HandleCache::new();
        let handle = cache.set(7u32).unwrap();

        assert!(cache.has(&handle));
        assert_eq!(cache.get(&handle), Some(&7));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.del(&handle), Some(7));
        assert!(!cache.has(&handle));
        assert!(cache.get(&handle).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unknown_handle_misses() {
        let cache: HandleCache<u32> = HandleCache::new();
        let stale = Handle::from("no-such-entry");
        assert!(!cache.has(&stale));
        assert!(cache.get(&stale).is_none());
    }

    #[test]
    fn test_del_is_idempotent() {
        let mut cache = HandleCache::new();
        let handle = cache.set("v").unwrap();
        assert_eq!(cache.del(&handle), Some("v"));
        assert_eq!(cache.del(&handle), None);
    }

    #[test]
    fn test_each_insert_mints_a_distinct_handle() {
        let mut cache = HandleCache::new();
        let a = cache.set(1u8).unwrap();
        let b = cache.set(2u8).unwrap();
        assert_ne!(a, b);
        assert_eq!(cache.get(&a), Some(&1));
        assert_eq!(cache.get(&b), Some(&2));
    }

    #[test]
    fn test_capacity_limit_declines_inserts() {
        let mut cache = HandleCache::with_capacity_limit(1);
        let first = cache.set("a");
        assert!(first.is_some());
        assert!(cache.set("b").is_none());

        // Freeing the slot makes room again.
        cache.del(&first.unwrap());
        assert!(cache.set("c").is_some());
    }
}
