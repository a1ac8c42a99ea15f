//! Default configuration consulted when a `Locker` is built.
use crate::driver::LOCAL;
use crate::namespace::Namespace;
use serde::{Deserialize, Serialize};

/// Default namespace applied to every key.
pub const DEFAULT_NAMESPACE: &str = "locker";

/// Default separator between namespace and key.
pub const DEFAULT_SEPARATOR: &str = ".";

/// Settings a `Locker` is constructed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockerConfig {
    /// Name of the driver to resolve.
    pub driver: String,
    /// Namespace prefix applied to every key.
    pub namespace: Namespace,
    /// String placed between namespace and key.
    pub separator: String,
    /// Whether change events are emitted.
    pub events_enabled: bool,
}

impl Default for LockerConfig {
    fn default() -> Self {
        Self {
            driver: LOCAL.to_string(),
            namespace: Namespace::Named(DEFAULT_NAMESPACE.to_string()),
            separator: DEFAULT_SEPARATOR.to_string(),
            events_enabled: true,
        }
    }
}
