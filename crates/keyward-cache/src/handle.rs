//! Opaque cache handles.

use serde::{Deserialize, Serialize};

/// An opaque token identifying one live cache entry.
///
/// Handles are minted by the cache on insertion (UUIDv4, unguessable) and
/// carry no semantic content. Any string converts into a `Handle`; a handle
/// that was not minted by the cache, or whose entry has been removed, simply
/// misses on lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(String);

impl Handle {
    /// Mint a fresh, unguessable handle.
    #[must_use]
    pub(crate) fn mint() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The handle as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Handle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Handle {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minted_handles_are_unique() {
        let a = Handle::mint();
        let b = Handle::mint();
        assert_ne!(a, b);
    }

    #[test]
    fn test_handle_from_string_round_trips() {
        let handle = Handle::from("some-token");
        assert_eq!(handle.as_str(), "some-token");
        assert_eq!(handle.to_string(), "some-token");
    }

    #[test]
    fn test_handle_serializes_as_plain_string() {
        let handle = Handle::from("abc");
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
