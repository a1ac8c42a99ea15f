//! Contains the namespace-wide operations of the `Locker`.
use super::Locker;
use crate::codec;
use crate::Result;
use serde_json::{Map, Value};
use tracing::{info, warn};

impl Locker {
    /// Returns every item in the current namespace, keyed by logical key.
    pub fn all(&self) -> Result<Map<String, Value>> {
        self.core.ensure_supported()?;
        let core = &self.core;
        let items = core
            .driver
            .entries()?
            .into_iter()
            .filter_map(|(physical, raw)| {
                core.namespace
                    .logical_key(&core.separator, &physical)
                    .map(|key| (key.to_string(), codec::deserialize(&raw)))
            })
            .collect();
        Ok(items)
    }

    /// Returns the logical keys of the current namespace.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.core.ensure_supported()?;
        let core = &self.core;
        let mut keys: Vec<String> = core
            .driver
            .keys()?
            .iter()
            .filter_map(|physical| core.namespace.logical_key(&core.separator, physical))
            .map(str::to_string)
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Number of items in the current namespace.
    pub fn count(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    /// Removes every item in the current namespace. Other namespaces on the
    /// same driver are left alone.
    pub fn clean(&self) -> Result<&Self> {
        let keys = self.keys()?;
        info!(
            driver = %self.core.driver_name,
            namespace = %self.core.namespace,
            count = keys.len(),
            "cleaning namespace"
        );
        self.forget(keys)
    }

    /// Clears the ENTIRE driver, regardless of namespace.
    ///
    /// This removes data written by every namespace and every other client of
    /// the same backend, and cannot be undone. Use [`clean`](Self::clean) to
    /// remove only this namespace.
    pub fn empty(&self) -> Result<&Self> {
        self.core.ensure_supported()?;
        warn!(driver = %self.core.driver_name, "emptying storage driver");
        self.core.driver.clear()?;
        Ok(self)
    }
}
