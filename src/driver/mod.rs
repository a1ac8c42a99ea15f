//! Storage drivers and the registry that maps driver names to them.
//!
//! A driver is a synchronous, string-only key/value store. The crate ships a
//! volatile [`MemoryDriver`] and a durable [`FileDriver`]; anything else can be
//! plugged in through [`DriverRegistry::register`].

mod file;
mod memory;

pub use file::FileDriver;
pub use memory::{MemoryDriver, StorageQuota};

use crate::error::{DriverError, LockerError, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Name of the built-in durable driver.
pub const LOCAL: &str = "local";

/// Name of the built-in volatile driver.
pub const SESSION: &str = "session";

/// Process-wide backing store of the built-in `local` driver.
static LOCAL_STORE: Lazy<Arc<MemoryDriver>> = Lazy::new(|| Arc::new(MemoryDriver::new()));

/// Process-wide backing store of the built-in `session` driver.
static SESSION_STORE: Lazy<Arc<MemoryDriver>> = Lazy::new(|| Arc::new(MemoryDriver::new()));

/// A specialized `Result` type for driver calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A synchronous key/value backend keyed by physical keys.
pub trait Driver: Send + Sync + fmt::Debug {
    /// Reads the raw value stored under `key`.
    fn get(&self, key: &str) -> DriverResult<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// Capacity failures must be reported as [`DriverError::QuotaExceeded`].
    fn set(&self, key: &str, value: &str) -> DriverResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> DriverResult<()>;

    /// Checks whether `key` is present.
    fn has(&self, key: &str) -> DriverResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Removes every entry in the backend.
    fn clear(&self) -> DriverResult<()>;

    /// Returns every physical key with its raw value.
    fn entries(&self) -> DriverResult<Vec<(String, String)>>;

    /// Returns every physical key.
    fn keys(&self) -> DriverResult<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(key, _)| key).collect())
    }

    /// Number of entries in the backend.
    fn len(&self) -> DriverResult<usize> {
        Ok(self.keys()?.len())
    }

    /// Checks whether the backend holds no entries.
    fn is_empty(&self) -> DriverResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Maps symbolic driver names to backends.
///
/// Cloning a registry yields a handle to the same set of drivers, so every
/// `Locker` forked from one provider resolves names the same way.
#[derive(Clone)]
pub struct DriverRegistry {
    drivers: Arc<RwLock<HashMap<String, Arc<dyn Driver>>>>,
}

impl DriverRegistry {
    /// Creates a registry with no drivers.
    pub fn empty() -> Self {
        Self {
            drivers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a registry holding the built-in `local` and `session` drivers.
    ///
    /// Both are process-lifetime stores shared by every registry created this
    /// way, so lockers built separately still see each other's items.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(LOCAL, Arc::clone(&*LOCAL_STORE) as Arc<dyn Driver>);
        registry.register(SESSION, Arc::clone(&*SESSION_STORE) as Arc<dyn Driver>);
        registry
    }

    /// Creates a registry whose `local` and `session` drivers are fresh,
    /// private memory stores.
    pub fn isolated() -> Self {
        let registry = Self::empty();
        registry.register(LOCAL, Arc::new(MemoryDriver::new()));
        registry.register(SESSION, Arc::new(MemoryDriver::new()));
        registry
    }

    /// Adds a driver, replacing any driver already registered under `name`.
    pub fn register(&self, name: impl Into<String>, driver: Arc<dyn Driver>) {
        let name = name.into();
        tracing::debug!(driver = %name, "registering storage driver");
        self.drivers.write().insert(name, driver);
    }

    /// Looks up the driver registered under `name`.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Driver>> {
        self.drivers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| LockerError::DriverNotFound(name.to_string()))
    }

    /// Checks whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.drivers.read().contains_key(name)
    }

    /// Lists the registered driver names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.drivers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
