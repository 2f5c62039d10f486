//! Argument bags passed to `create` / `get`.
//!
//! A bag is an ordered list of keyed values. Keys are either positions or
//! parameter names, and the shape of the keys decides how the binder reads
//! the bag: see [`Arguments::is_positional`].

use std::collections::HashMap;

use crate::value::Value;

/// Key of a single entry in an [`Arguments`] bag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgKey {
    Index(usize),
    Name(String),
}

impl From<usize> for ArgKey {
    fn from(index: usize) -> Self {
        ArgKey::Index(index)
    }
}

impl From<&str> for ArgKey {
    fn from(name: &str) -> Self {
        ArgKey::Name(name.to_owned())
    }
}

impl From<String> for ArgKey {
    fn from(name: String) -> Self {
        ArgKey::Name(name)
    }
}

/// Ordered argument bag.
///
/// Inserting an existing key replaces its value in place, so the original
/// insertion order is kept.
///
/// # Examples
/// ```
/// use sinaa_container::arguments::Arguments;
///
/// let named = Arguments::new().with("name", "world");
/// assert!(!named.is_positional());
///
/// let positional = Arguments::positional([true.into(), "x".into()]);
/// assert!(positional.is_positional());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    entries: Vec<(ArgKey, Value)>,
}

impl Arguments {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// A bag keyed `0..n` in order.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            entries: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (ArgKey::Index(i), v))
                .collect(),
        }
    }

    /// A bag keyed by parameter name.
    pub fn named<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut args = Self::new();
        for (k, v) in values {
            args.insert(ArgKey::Name(k.into()), v);
        }
        args
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<ArgKey>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<ArgKey>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &ArgKey) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &ArgKey) -> bool {
        self.get(key).is_some()
    }

    pub fn by_name(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find_map(|(k, v)| match k {
            ArgKey::Name(n) if n == name => Some(v),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArgKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Returns `true` when the keys are exactly `0, 1, …, n-1` in order.
    ///
    /// Anything else, including an empty bag or sparse indexes, is read by
    /// parameter name.
    pub fn is_positional(&self) -> bool {
        !self.entries.is_empty()
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(i, (k, _))| *k == ArgKey::Index(i))
    }

    /// Adds every default whose key is not already present.
    ///
    /// Caller values always win; defaults are appended after them.
    pub fn or_defaults<'a>(mut self, defaults: impl IntoIterator<Item = (&'a String, &'a Value)>) -> Self {
        for (name, value) in defaults {
            let key = ArgKey::Name(name.clone());
            if !self.contains_key(&key) {
                self.entries.push((key, value.clone()));
            }
        }
        self
    }
}

impl From<HashMap<String, Value>> for Arguments {
    fn from(map: HashMap<String, Value>) -> Self {
        Self::named(map)
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self::positional(values)
    }
}
