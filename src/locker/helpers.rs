//! Item-level primitives shared by the public operations and binding watchers.
use super::Core;
use crate::codec;
use crate::driver::Driver;
use crate::events::{EventKind, LockerEvent};
use crate::{LockerError, Result};
use serde_json::Value;
use tracing::debug;

/// Throwaway key written by the capability probe.
const PROBE_KEY: &str = "__locker_probe__";

/// Checks that `driver` accepts a write and a delete.
///
/// A value already stored under the probe key is put back afterwards. A full
/// backend still counts as usable.
pub(crate) fn probe(driver: &dyn Driver) -> bool {
    let outcome = driver.get(PROBE_KEY).and_then(|previous| {
        driver.set(PROBE_KEY, PROBE_KEY)?;
        match previous {
            Some(value) => driver.set(PROBE_KEY, &value),
            None => driver.remove(PROBE_KEY),
        }
    });
    match outcome {
        Ok(()) => true,
        Err(err) if err.is_quota_exceeded() => {
            debug!(error = %err, "storage driver is full but usable");
            true
        }
        Err(err) => {
            debug!(error = %err, "storage driver failed the support probe");
            false
        }
    }
}

impl Core {
    pub(crate) fn supported(&self) -> bool {
        *self.supported.get_or_init(|| probe(self.driver.as_ref()))
    }

    pub(crate) fn ensure_supported(&self) -> Result<()> {
        if self.supported() {
            Ok(())
        } else {
            Err(LockerError::UnsupportedBackend {
                driver: self.driver_name.clone(),
            })
        }
    }

    pub(crate) fn physical_key(&self, key: &str) -> String {
        self.namespace.physical_key(&self.separator, key)
    }

    /// Reads and decodes the item stored under `key`.
    pub(crate) fn read_item(&self, key: &str) -> Result<Option<Value>> {
        self.ensure_supported()?;
        let raw = self.driver.get(&self.physical_key(key))?;
        Ok(raw.map(|raw| codec::deserialize(&raw)))
    }

    pub(crate) fn exists(&self, key: &str) -> Result<bool> {
        self.ensure_supported()?;
        Ok(self.driver.has(&self.physical_key(key))?)
    }

    /// Encodes and stores `value`, emitting `added` or `updated`.
    pub(crate) fn write_item(&self, key: &str, value: Value) -> Result<()> {
        self.ensure_supported()?;
        let physical = self.physical_key(key);
        let previous = self.driver.get(&physical)?;

        self.driver
            .set(&physical, &codec::serialize(&value))
            .map_err(|err| LockerError::from_write(key, err))?;
        debug!(driver = %self.driver_name, key = %physical, "stored item");

        let kind = match previous {
            Some(raw) => EventKind::Updated {
                old_value: codec::deserialize(&raw),
                new_value: value,
            },
            None => EventKind::Added { value },
        };
        self.event(kind, key);
        Ok(())
    }

    /// Removes `key`, returning whether it existed.
    pub(crate) fn remove_item(&self, key: &str) -> Result<bool> {
        self.ensure_supported()?;
        let physical = self.physical_key(key);
        if !self.driver.has(&physical)? {
            return Ok(false);
        }
        self.driver.remove(&physical)?;
        debug!(driver = %self.driver_name, key = %physical, "removed item");

        self.event(EventKind::Forgotten, key);
        Ok(true)
    }

    fn event(&self, kind: EventKind, key: &str) {
        if !self.events_enabled {
            return;
        }
        self.emitter.emit(LockerEvent {
            kind,
            key: key.to_string(),
            driver: self.driver_name.clone(),
            namespace: self.namespace.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverResult, MemoryDriver, StorageQuota};
    use crate::error::DriverError;

    #[derive(Debug)]
    struct ReadOnlyDriver;

    impl Driver for ReadOnlyDriver {
        fn get(&self, _key: &str) -> DriverResult<Option<String>> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> DriverResult<()> {
            Err(DriverError::Unavailable("read-only".to_string()))
        }
        fn remove(&self, _key: &str) -> DriverResult<()> {
            Ok(())
        }
        fn clear(&self) -> DriverResult<()> {
            Ok(())
        }
        fn entries(&self) -> DriverResult<Vec<(String, String)>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_probe_leaves_no_trace() {
        let driver = MemoryDriver::new();
        assert!(probe(&driver));
        assert!(driver.is_empty().unwrap());
    }

    #[test]
    fn test_probe_fails_for_unwritable_driver() {
        assert!(!probe(&ReadOnlyDriver));
    }

    #[test]
    fn test_full_driver_is_supported() {
        let driver = MemoryDriver::with_quota(StorageQuota {
            max_keys: Some(1),
            max_bytes: None,
        });
        driver.set("taken", "1").unwrap();

        assert!(probe(&driver));
        assert_eq!(driver.keys().unwrap(), vec!["taken"]);
    }

    #[test]
    fn test_support_check_restores_existing_entry() {
        let driver = MemoryDriver::new();
        driver.set(PROBE_KEY, "user data").unwrap();

        assert!(probe(&driver));
        assert_eq!(driver.get(PROBE_KEY).unwrap().as_deref(), Some("user data"));
    }
}
