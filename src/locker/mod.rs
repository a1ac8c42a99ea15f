//! Contains the `Locker` struct, the primary handle for all storage operations.
//!
//! A `Locker` pairs one driver with one namespace. Switching either produces a
//! new, independent `Locker`; the receiver is never mutated.

mod bind;
mod helpers;
mod ops_batch;
mod ops_single;

use crate::binding::BindingRegistry;
use crate::config::LockerConfig;
use crate::driver::{Driver, DriverRegistry};
use crate::events::Emitter;
use crate::namespace::Namespace;
use crate::provider::LockerProvider;
use crate::Result;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

pub(crate) use helpers::probe;

/// State shared with binding watchers. Immutable apart from the support cache.
pub(crate) struct Core {
    driver_name: String,
    driver: Arc<dyn Driver>,
    namespace: Namespace,
    separator: String,
    events_enabled: bool,
    supported: OnceCell<bool>,
    emitter: Emitter,
}

/// A namespaced view over one storage driver.
pub struct Locker {
    core: Arc<Core>,
    registry: DriverRegistry,
    bindings: Mutex<BindingRegistry>,
}

// MARK: - Core & Construction
impl Locker {
    /// Creates a new provider for configuring a `Locker`.
    /// This is the main entry point for creating a new locker.
    pub fn builder() -> LockerProvider {
        LockerProvider::new()
    }

    /// Builds a locker from `config`, resolving its driver in `registry`.
    pub(crate) fn from_config(
        config: &LockerConfig,
        registry: DriverRegistry,
        emitter: Emitter,
    ) -> Result<Self> {
        let driver = registry.resolve(&config.driver)?;
        Ok(Self::with_parts(
            config.driver.clone(),
            driver,
            config.namespace.clone(),
            config.separator.clone(),
            config.events_enabled,
            registry,
            emitter,
        ))
    }

    fn with_parts(
        driver_name: String,
        driver: Arc<dyn Driver>,
        namespace: Namespace,
        separator: String,
        events_enabled: bool,
        registry: DriverRegistry,
        emitter: Emitter,
    ) -> Self {
        Self {
            core: Arc::new(Core {
                driver_name,
                driver,
                namespace,
                separator,
                events_enabled,
                supported: OnceCell::new(),
                emitter,
            }),
            registry,
            bindings: Mutex::new(BindingRegistry::default()),
        }
    }

    /// Returns a new locker over the driver registered as `name`, keeping this
    /// locker's namespace, separator and event setting.
    ///
    /// Fails with [`LockerError::DriverNotFound`](crate::LockerError::DriverNotFound)
    /// if `name` is not registered.
    pub fn driver(&self, name: &str) -> Result<Locker> {
        let driver = self.registry.resolve(name)?;
        Ok(Self::with_parts(
            name.to_string(),
            driver,
            self.core.namespace.clone(),
            self.core.separator.clone(),
            self.core.events_enabled,
            self.registry.clone(),
            self.core.emitter.clone(),
        ))
    }

    /// Returns a new locker over the same driver using `namespace`.
    pub fn namespace(&self, namespace: impl Into<Namespace>) -> Locker {
        Self::with_parts(
            self.core.driver_name.clone(),
            Arc::clone(&self.core.driver),
            namespace.into(),
            self.core.separator.clone(),
            self.core.events_enabled,
            self.registry.clone(),
            self.core.emitter.clone(),
        )
    }

    /// Name of the driver this locker writes to.
    pub fn driver_name(&self) -> &str {
        &self.core.driver_name
    }

    /// The backend this locker writes to.
    pub fn current_driver(&self) -> Arc<dyn Driver> {
        Arc::clone(&self.core.driver)
    }

    /// The namespace applied to every key.
    pub fn current_namespace(&self) -> &Namespace {
        &self.core.namespace
    }

    /// The separator between namespace and key.
    pub fn separator(&self) -> &str {
        &self.core.separator
    }

    /// Whether change events are emitted.
    pub fn events_enabled(&self) -> bool {
        self.core.events_enabled
    }

    /// The registry used to resolve driver names.
    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Checks whether the current driver is usable. The result is cached for
    /// the life of this locker.
    pub fn supported(&self) -> bool {
        self.core.supported()
    }

    /// Checks whether the driver registered as `name` is usable, without
    /// touching this locker's cache.
    pub fn supports(&self, name: &str) -> Result<bool> {
        let driver = self.registry.resolve(name)?;
        Ok(probe(driver.as_ref()))
    }
}

impl fmt::Debug for Locker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Locker")
            .field("driver", &self.core.driver_name)
            .field("namespace", &self.core.namespace)
            .field("separator", &self.core.separator)
            .field("events_enabled", &self.core.events_enabled)
            .field("supported", &self.core.supported.get())
            .field("bindings", &self.bindings.lock().len())
            .finish()
    }
}
