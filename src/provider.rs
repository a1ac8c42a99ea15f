//! Contains the `LockerProvider` for fluently configuring and building a `Locker`.
use crate::config::LockerConfig;
use crate::driver::{Driver, DriverRegistry, FileDriver, LOCAL};
use crate::events::{Emitter, EventSink};
use crate::locker::Locker;
use crate::namespace::Namespace;
use crate::{DriverError, LockerError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for creating `Locker` instances
///
/// Holds the default configuration until [`build`](Self::build) consumes it,
/// so settings can only change before the first locker exists. Every setter
/// has a `*_with` variant taking a closure, which is evaluated immediately.
///
/// # Example
///
/// ```rust
/// use locker::{Locker, Result};
///
/// # fn run() -> Result<()> {
/// let locker = Locker::builder()
///     .driver("session")
///     .namespace("myApp")
///     .events_enabled(false)
///     .build()?;
///
/// locker.put("greeting", "hello")?;
/// # Ok(())
/// # }
/// ```
pub struct LockerProvider {
    config: LockerConfig,
    persistence_path: Option<PathBuf>,
    isolated: bool,
    drivers: Vec<(String, Arc<dyn Driver>)>,
    sink: Option<Arc<dyn EventSink>>,
}

impl LockerProvider {
    /// Create a new provider with the built-in defaults
    pub fn new() -> Self {
        Self {
            config: LockerConfig::default(),
            persistence_path: None,
            isolated: false,
            drivers: Vec::new(),
            sink: None,
        }
    }

    /// The configuration the locker will be built from.
    pub fn config(&self) -> &LockerConfig {
        &self.config
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: LockerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default driver name
    pub fn driver(mut self, name: impl Into<String>) -> Self {
        self.config.driver = name.into();
        self
    }

    /// Set the default driver name from a closure
    pub fn driver_with<F, S>(self, producer: F) -> Self
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.driver(producer())
    }

    /// Set the default namespace; an empty name disables prefixing
    pub fn namespace(mut self, namespace: impl Into<Namespace>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Set the default namespace from a closure
    pub fn namespace_with<F, N>(self, producer: F) -> Self
    where
        F: FnOnce() -> N,
        N: Into<Namespace>,
    {
        self.namespace(producer())
    }

    /// Set the separator placed between namespace and key
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    /// Set the separator from a closure
    pub fn separator_with<F, S>(self, producer: F) -> Self
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.separator(producer())
    }

    /// Enable or disable change events
    pub fn events_enabled(mut self, enabled: bool) -> Self {
        self.config.events_enabled = enabled;
        self
    }

    /// Enable or disable change events from a closure
    pub fn events_enabled_with<F>(self, producer: F) -> Self
    where
        F: FnOnce() -> bool,
    {
        self.events_enabled(producer())
    }

    /// Enable file-based persistence for the `local` driver
    ///
    /// # Arguments
    ///
    /// * `path` - The snapshot file the durable driver reads and writes
    pub fn with_persistence(mut self, path: PathBuf) -> Self {
        self.persistence_path = Some(path);
        self
    }

    /// Give the locker private `local` and `session` stores instead of the
    /// process-wide ones
    pub fn isolated(mut self) -> Self {
        self.isolated = true;
        self
    }

    /// Register a custom driver, overriding any built-in of the same name
    pub fn register_driver(mut self, name: impl Into<String>, driver: Arc<dyn Driver>) -> Self {
        self.drivers.push((name.into(), driver));
        self
    }

    /// Send change events to `sink`
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the `Locker` with the configured options
    ///
    /// Fails with [`LockerError::DriverNotFound`] if the configured driver is
    /// not registered, with [`LockerError::Io`] if the persistence file cannot
    /// be read, or with [`LockerError::Backend`] if it holds no valid snapshot.
    pub fn build(self) -> Result<Locker> {
        let registry = if self.isolated {
            DriverRegistry::isolated()
        } else {
            DriverRegistry::new()
        };

        if let Some(path) = self.persistence_path {
            let driver = FileDriver::shared(path).map_err(|err| match err {
                DriverError::Io(io) => LockerError::Io(io),
                other => LockerError::Backend(other),
            })?;
            tracing::info!(path = %driver.path().display(), "using durable local storage");
            registry.register(LOCAL, driver);
        }
        for (name, driver) in self.drivers {
            registry.register(name, driver);
        }

        let emitter = self.sink.map(Emitter::new).unwrap_or_default();
        Locker::from_config(&self.config, registry, emitter)
    }
}

impl Default for LockerProvider {
    fn default() -> Self {
        Self::new()
    }
}
