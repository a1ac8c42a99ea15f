//! Argument and result types shared by the `Locker` operations.
//!
//! Operations that accept "a key, several keys, or something that produces
//! them" take one of the enums below and dispatch on the variant.
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fmt;

/// Key argument for reads, existence checks and removals.
pub enum Keys<'a> {
    /// A single logical key.
    One(String),
    /// A sequence of logical keys.
    Many(Vec<String>),
    /// Computes the keys when the operation runs.
    Producer(Box<dyn FnOnce() -> Keys<'a> + 'a>),
}

impl<'a> Keys<'a> {
    /// Defers key computation until the operation runs.
    pub fn from_fn<F>(producer: F) -> Self
    where
        F: FnOnce() -> Keys<'a> + 'a,
    {
        Keys::Producer(Box::new(producer))
    }
}

impl fmt::Debug for Keys<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keys::One(key) => f.debug_tuple("One").field(key).finish(),
            Keys::Many(keys) => f.debug_tuple("Many").field(keys).finish(),
            Keys::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<&str> for Keys<'_> {
    fn from(key: &str) -> Self {
        Keys::One(key.to_string())
    }
}

impl From<String> for Keys<'_> {
    fn from(key: String) -> Self {
        Keys::One(key)
    }
}

impl From<&String> for Keys<'_> {
    fn from(key: &String) -> Self {
        Keys::One(key.clone())
    }
}

impl From<Vec<String>> for Keys<'_> {
    fn from(keys: Vec<String>) -> Self {
        Keys::Many(keys)
    }
}

impl From<Vec<&str>> for Keys<'_> {
    fn from(keys: Vec<&str>) -> Self {
        Keys::Many(keys.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Keys<'_> {
    fn from(keys: &[&str]) -> Self {
        Keys::Many(keys.iter().map(|key| key.to_string()).collect())
    }
}

impl From<&[String]> for Keys<'_> {
    fn from(keys: &[String]) -> Self {
        Keys::Many(keys.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Keys<'_> {
    fn from(keys: [&str; N]) -> Self {
        Keys::Many(keys.iter().map(|key| key.to_string()).collect())
    }
}

/// Key argument for writes: one key, or a mapping of keys to values.
pub enum Entries<'a> {
    /// A single logical key; the value comes from the separate value argument.
    One(String),
    /// Logical keys with their values; the value argument is ignored.
    Map(Map<String, Value>),
    /// Computes the entries when the operation runs.
    Producer(Box<dyn FnOnce() -> Entries<'a> + 'a>),
}

impl<'a> Entries<'a> {
    /// Defers entry computation until the operation runs.
    pub fn from_fn<F>(producer: F) -> Self
    where
        F: FnOnce() -> Entries<'a> + 'a,
    {
        Entries::Producer(Box::new(producer))
    }
}

impl fmt::Debug for Entries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entries::One(key) => f.debug_tuple("One").field(key).finish(),
            Entries::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Entries::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<&str> for Entries<'_> {
    fn from(key: &str) -> Self {
        Entries::One(key.to_string())
    }
}

impl From<String> for Entries<'_> {
    fn from(key: String) -> Self {
        Entries::One(key)
    }
}

impl From<&String> for Entries<'_> {
    fn from(key: &String) -> Self {
        Entries::One(key.clone())
    }
}

impl From<Map<String, Value>> for Entries<'_> {
    fn from(map: Map<String, Value>) -> Self {
        Entries::Map(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Entries<'_> {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Entries::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Value argument for writes.
pub enum PutValue<'a> {
    /// No value was supplied; single-key writes are skipped.
    Absent,
    /// A literal value.
    Value(Value),
    /// Receives the current stored value (or the fallback when the item is
    /// absent) and returns the value to store.
    Producer(Box<dyn FnOnce(Option<Value>) -> Value + 'a>),
}

impl<'a> PutValue<'a> {
    /// Computes the stored value from the current one.
    pub fn from_fn<F>(producer: F) -> Self
    where
        F: FnOnce(Option<Value>) -> Value + 'a,
    {
        PutValue::Producer(Box::new(producer))
    }
}

impl fmt::Debug for PutValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PutValue::Absent => f.write_str("Absent"),
            PutValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            PutValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<Option<Value>> for PutValue<'_> {
    fn from(value: Option<Value>) -> Self {
        value.map(PutValue::Value).unwrap_or(PutValue::Absent)
    }
}

macro_rules! impl_put_value_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for PutValue<'_> {
                fn from(value: $ty) -> Self {
                    PutValue::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_put_value_from!(
    Value,
    &str,
    String,
    bool,
    i32,
    i64,
    u32,
    u64,
    usize,
    f64,
    Map<String, Value>,
    Vec<Value>,
);

/// Result of a read that may address one key or several.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieved {
    /// Result of a single-key read: the value, the default, or nothing.
    Item(Option<Value>),
    /// Result of a multi-key read: present keys only.
    Items(Map<String, Value>),
}

impl Retrieved {
    /// The single item, or `None` for a multi-key result.
    pub fn into_item(self) -> Option<Value> {
        match self {
            Retrieved::Item(value) => value,
            Retrieved::Items(_) => None,
        }
    }

    /// The items of a multi-key result; a single item yields an empty map.
    pub fn into_items(self) -> Map<String, Value> {
        match self {
            Retrieved::Item(_) => Map::new(),
            Retrieved::Items(items) => items,
        }
    }
}

/// Hash utilities for deriving stable identifiers.
pub struct HashUtils;

impl HashUtils {
    /// Hash a string to SHA256
    pub fn hash(input: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        hasher.finalize().into()
    }
}
