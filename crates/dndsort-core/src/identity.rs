//! Stable keys for list values.
//!
//! A key follows a value across reorders. Values are joined to keys by
//! equality, so two equal values in one list share a key.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// Opaque identifier assigned to a value for as long as it is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(String);

impl ItemKey {
    /// Wrap an existing identifier.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh, unique keys.
pub trait KeyGenerator {
    /// Mint a key that has never been returned before.
    fn generate(&mut self) -> ItemKey;
}

/// Random v4 UUID keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidKeys;

impl KeyGenerator for UuidKeys {
    fn generate(&mut self) -> ItemKey {
        ItemKey(Uuid::new_v4().simple().to_string())
    }
}

/// Maps values to the key they were first seen with.
///
/// Entries are never removed; a stale entry only costs memory.
pub struct KeyRegistry<T> {
    keys: HashMap<T, ItemKey>,
    generator: Box<dyn KeyGenerator>,
}

impl<T: Eq + Hash + Clone> KeyRegistry<T> {
    /// Create a registry that mints UUID keys.
    pub fn new() -> Self {
        Self::with_generator(UuidKeys)
    }

    /// Create a registry with a custom key source.
    pub fn with_generator(generator: impl KeyGenerator + 'static) -> Self {
        Self {
            keys: HashMap::new(),
            generator: Box::new(generator),
        }
    }

    /// Return the key for `value`, minting and remembering one if needed.
    pub fn key_for(&mut self, value: &T) -> ItemKey {
        if let Some(key) = self.keys.get(value) {
            return key.clone();
        }
        let key = self.generator.generate();
        self.keys.insert(value.clone(), key.clone());
        key
    }

    /// Look up a key without minting.
    pub fn get(&self, value: &T) -> Option<&ItemKey> {
        self.keys.get(value)
    }

    /// Number of remembered values.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<T: Eq + Hash + Clone> Default for KeyRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
