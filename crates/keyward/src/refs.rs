//! Key references: what callers hand to the service.

use keyward_cache::Handle;

use crate::proxy::ProxyKey;

/// A reference to a cached key: a bare handle, or a proxy carrying one.
///
/// Resolution always reduces a `KeyRef` to its handle, then looks the
/// handle up in the cache.
#[derive(Debug, Clone)]
pub enum KeyRef {
    /// A bare cache handle.
    Handle(Handle),
    /// A proxy key previously returned by the service.
    Proxy(ProxyKey),
}

impl KeyRef {
    /// The handle this reference reduces to.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        match self {
            Self::Handle(handle) => handle,
            Self::Proxy(proxy) => proxy.handle(),
        }
    }
}

impl From<Handle> for KeyRef {
    fn from(handle: Handle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&Handle> for KeyRef {
    fn from(handle: &Handle) -> Self {
        Self::Handle(handle.clone())
    }
}

impl From<ProxyKey> for KeyRef {
    fn from(proxy: ProxyKey) -> Self {
        Self::Proxy(proxy)
    }
}

impl From<&ProxyKey> for KeyRef {
    fn from(proxy: &ProxyKey) -> Self {
        Self::Proxy(proxy.clone())
    }
}

impl From<&str> for KeyRef {
    fn from(handle: &str) -> Self {
        Self::Handle(Handle::from(handle))
    }
}

impl From<String> for KeyRef {
    fn from(handle: String) -> Self {
        Self::Handle(Handle::from(handle))
    }
}

/// A normalized batch of key references.
///
/// A bare reference converts into a one-element batch; emptiness is only
/// diagnosed at resolution time (`no key references`).
#[derive(Debug, Clone, Default)]
pub struct KeyRefs(Vec<KeyRef>);

impl KeyRefs {
    /// Number of references in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the references in batch order.
    pub fn iter(&self) -> std::slice::Iter<'_, KeyRef> {
        self.0.iter()
    }

    /// Append a reference to the batch.
    pub fn push(&mut self, key_ref: impl Into<KeyRef>) {
        self.0.push(key_ref.into());
    }
}

impl<'a> IntoIterator for &'a KeyRefs {
    type Item = &'a KeyRef;
    type IntoIter = std::slice::Iter<'a, KeyRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<KeyRef> for KeyRefs {
    fn from_iter<I: IntoIterator<Item = KeyRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<KeyRef> for KeyRefs {
    fn from(key_ref: KeyRef) -> Self {
        Self(vec![key_ref])
    }
}

impl From<Vec<KeyRef>> for KeyRefs {
    fn from(refs: Vec<KeyRef>) -> Self {
        Self(refs)
    }
}

impl From<&[KeyRef]> for KeyRefs {
    fn from(refs: &[KeyRef]) -> Self {
        Self(refs.to_vec())
    }
}

impl From<Handle> for KeyRefs {
    fn from(handle: Handle) -> Self {
        Self(vec![KeyRef::from(handle)])
    }
}

impl From<&Handle> for KeyRefs {
    fn from(handle: &Handle) -> Self {
        Self(vec![KeyRef::from(handle)])
    }
}

impl From<ProxyKey> for KeyRefs {
    fn from(proxy: ProxyKey) -> Self {
        Self(vec![KeyRef::from(proxy)])
    }
}

impl From<&ProxyKey> for KeyRefs {
    fn from(proxy: &ProxyKey) -> Self {
        Self(vec![KeyRef::from(proxy)])
    }
}

impl From<&str> for KeyRefs {
    fn from(handle: &str) -> Self {
        Self(vec![KeyRef::from(handle)])
    }
}

impl From<String> for KeyRefs {
    fn from(handle: String) -> Self {
        Self(vec![KeyRef::from(handle)])
    }
}

/// The reference map for the combined encrypt/decrypt operations.
///
/// `encrypt` signs with the private `auth` keys and encrypts to the
/// `cipher` keys; `decrypt` decrypts with the first private `cipher` key
/// and verifies against the `auth` keys.
#[derive(Debug, Clone, Default)]
pub struct KeyRefMap {
    /// Authentication (signing / verification) key references.
    pub auth: KeyRefs,
    /// Encryption / decryption key references.
    pub cipher: KeyRefs,
}

impl KeyRefMap {
    /// Build a reference map from anything convertible to reference
    /// batches.
    pub fn new(auth: impl Into<KeyRefs>, cipher: impl Into<KeyRefs>) -> Self {
        Self {
            auth: auth.into(),
            cipher: cipher.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_ref_becomes_one_element_batch() {
        let refs = KeyRefs::from("some-handle");
        assert_eq!(refs.len(), 1);
        assert!(!refs.is_empty());
        assert_eq!(refs.iter().next().unwrap().handle().as_str(), "some-handle");
    }

    #[test]
    fn test_default_batch_is_empty() {
        assert!(KeyRefs::default().is_empty());
    }

    #[test]
    fn test_handle_extraction_from_either_shape() {
        let from_handle = KeyRef::from(Handle::from("h1"));
        assert_eq!(from_handle.handle().as_str(), "h1");

        let from_string = KeyRef::from("h2".to_owned());
        assert_eq!(from_string.handle().as_str(), "h2");
    }

    #[test]
    fn test_batch_preserves_order() {
        let refs: KeyRefs = vec![KeyRef::from("a"), KeyRef::from("b"), KeyRef::from("c")]
            .into_iter()
            .collect();
        let order: Vec<&str> = refs.iter().map(|r| r.handle().as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }
}
