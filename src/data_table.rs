//! Contains the `DataTable` struct, the in-memory table behind the built-in drivers.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// DataTable newtype mapping physical keys to encoded values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable(HashMap<String, String>);

impl DataTable {
    /// Create a new empty data table
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Get a value by key
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a key-value pair, returns the old value if it existed
    pub fn set_value(&mut self, key: &str, value: &str) -> Option<String> {
        self.0.insert(key.to_string(), value.to_string())
    }

    /// Delete a key-value pair, returns the old value if it existed
    pub fn delete_value(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Check if a key exists
    pub fn has_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// List all keys in the table
    pub fn all_keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// Copy out every entry
    pub fn entries(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Clear all data from the table
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Get the total memory usage (keys + values) in bytes
    pub fn total_size(&self) -> usize {
        self.0.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Size in bytes of the entry stored under `key`, zero if absent
    pub fn entry_size(&self, key: &str) -> usize {
        self.0.get(key).map(|v| key.len() + v.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let mut table = DataTable::new();
        assert!(table.set_value("a", "1").is_none());
        assert_eq!(table.set_value("a", "2").as_deref(), Some("1"));
        assert_eq!(table.get_value("a"), Some("2"));
        assert!(table.has_key("a"));
        assert_eq!(table.delete_value("a").as_deref(), Some("2"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_sizes() {
        let mut table = DataTable::new();
        table.set_value("ab", "xyz");
        table.set_value("c", "");
        assert_eq!(table.len(), 2);
        assert_eq!(table.total_size(), 6);
        assert_eq!(table.entry_size("ab"), 5);
        assert_eq!(table.entry_size("missing"), 0);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut table = DataTable::new();
        table.set_value("locker.a", "\"x\"");
        let bytes = bincode::serialize(&table).unwrap();
        let restored: DataTable = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, table);
    }
}
