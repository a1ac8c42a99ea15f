//! Volatile in-memory driver with optional capacity limits.
use super::{Driver, DriverResult};
use crate::data_table::DataTable;
use crate::error::DriverError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Capacity limits enforced by a [`MemoryDriver`]. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageQuota {
    /// Maximum number of entries.
    pub max_keys: Option<usize>,
    /// Maximum total size of keys plus values, in bytes.
    pub max_bytes: Option<usize>,
}

impl StorageQuota {
    /// A quota with no limits.
    pub fn unbounded() -> Self {
        Self::default()
    }

    fn check(&self, table: &DataTable, key: &str, value: &str) -> DriverResult<()> {
        let is_update = table.has_key(key);

        if let Some(max_keys) = self.max_keys {
            if !is_update && table.len() >= max_keys {
                return Err(DriverError::QuotaExceeded {
                    limit: format!("maximum number of keys ({max_keys}) reached"),
                });
            }
        }

        if let Some(max_bytes) = self.max_bytes {
            let projected = table.total_size() - table.entry_size(key) + key.len() + value.len();
            if projected > max_bytes {
                return Err(DriverError::QuotaExceeded {
                    limit: format!("{projected} bytes exceeds maximum of {max_bytes} bytes"),
                });
            }
        }

        Ok(())
    }
}

/// A process-lifetime key/value store.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    table: RwLock<DataTable>,
    quota: StorageQuota,
}

impl MemoryDriver {
    /// Creates an empty, unbounded driver.
    pub fn new() -> Self {
        Self::with_quota(StorageQuota::unbounded())
    }

    /// Creates an empty driver that enforces `quota` on every write.
    pub fn with_quota(quota: StorageQuota) -> Self {
        Self {
            table: RwLock::new(DataTable::new()),
            quota,
        }
    }
}

impl Driver for MemoryDriver {
    fn get(&self, key: &str) -> DriverResult<Option<String>> {
        Ok(self.table.read().get_value(key).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> DriverResult<()> {
        let mut table = self.table.write();
        self.quota.check(&table, key, value)?;
        table.set_value(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> DriverResult<()> {
        self.table.write().delete_value(key);
        Ok(())
    }

    fn has(&self, key: &str) -> DriverResult<bool> {
        Ok(self.table.read().has_key(key))
    }

    fn clear(&self) -> DriverResult<()> {
        self.table.write().clear();
        Ok(())
    }

    fn entries(&self) -> DriverResult<Vec<(String, String)>> {
        Ok(self.table.read().entries())
    }

    fn keys(&self) -> DriverResult<Vec<String>> {
        Ok(self.table.read().all_keys())
    }

    fn len(&self) -> DriverResult<usize> {
        Ok(self.table.read().len())
    }
}
