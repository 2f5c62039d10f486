//! Type identification keys.
//!
//! [`TypeKey`] names a type known to the [`TypeCatalog`](crate::catalog::TypeCatalog).
//! Keys are plain strings so that mappings can be loaded from configuration
//! files and compared across crates without sharing Rust types.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifies a type in the catalog and in every registry.
///
/// Cloning is cheap: the name is shared behind an [`Arc`].
///
/// # Examples
/// ```
/// use sinaa_container::key::TypeKey;
///
/// let key = TypeKey::new("app::Logger");
/// assert_eq!(key.as_str(), "app::Logger");
/// assert_eq!(key, TypeKey::from("app::Logger"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
    /// Creates a key from any string-like name.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the name of the type.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeKey {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&TypeKey> for TypeKey {
    fn from(key: &TypeKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for TypeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TypeKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_equality_same_name() {
        assert_eq!(TypeKey::new("SimpleA"), TypeKey::from("SimpleA"));
        assert_eq!(TypeKey::from(String::from("SimpleA")), TypeKey::new("SimpleA"));
    }

    #[test]
    fn key_inequality_different_names() {
        assert_ne!(TypeKey::new("SimpleA"), TypeKey::new("SimpleB"));
    }

    #[test]
    fn key_in_hashmap_by_str() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(TypeKey::new("InterfaceC"), "InterfacedB");
        assert_eq!(map.get("InterfaceC"), Some(&"InterfacedB"));
        assert_eq!(map.get("AbstractC"), None);
    }

    #[test]
    fn keys_order_lexicographically() {
        let mut keys = vec![TypeKey::new("b"), TypeKey::new("a"), TypeKey::new("c")];
        keys.sort();
        let names: Vec<&str> = keys.iter().map(TypeKey::as_str).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn display_and_debug() {
        let key = TypeKey::new("app::Logger");
        assert_eq!(format!("{key}"), "app::Logger");
        assert_eq!(format!("{key:?}"), "TypeKey(app::Logger)");
    }
}
