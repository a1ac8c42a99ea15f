//! Maps logical keys to the physical keys stored in a driver.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A logical partition of keys inside one driver, implemented by prefixing.
///
/// `Disabled` stores logical keys unprefixed. An empty name converts to
/// `Disabled`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Namespace {
    /// No prefix is applied.
    Disabled,
    /// Keys are stored as `name + separator + key`.
    Named(String),
}

impl Namespace {
    /// Creates a namespace from a name; the empty string disables prefixing.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Namespace::Disabled
        } else {
            Namespace::Named(name)
        }
    }

    /// The namespace name, if prefixing is enabled.
    pub fn name(&self) -> Option<&str> {
        match self {
            Namespace::Disabled => None,
            Namespace::Named(name) => Some(name),
        }
    }

    /// Checks whether prefixing is disabled.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Namespace::Disabled)
    }

    /// Builds the physical key for `key`.
    pub fn physical_key(&self, separator: &str, key: &str) -> String {
        match self.name() {
            None => key.to_string(),
            Some(name) => format!("{name}{separator}{key}"),
        }
    }

    /// Strips this namespace's prefix from a physical key.
    ///
    /// Returns `None` when the key belongs to another namespace. Only the
    /// leading prefix is removed, so separators inside the namespace name or
    /// the logical key are kept intact.
    pub fn logical_key<'a>(&self, separator: &str, physical: &'a str) -> Option<&'a str> {
        match self.name() {
            None => Some(physical),
            Some(name) => physical
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix(separator)),
        }
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Namespace::Named(crate::config::DEFAULT_NAMESPACE.to_string())
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Namespace::new(name)
    }
}

impl From<String> for Namespace {
    fn from(name: String) -> Self {
        Namespace::new(name)
    }
}

impl From<Option<String>> for Namespace {
    fn from(name: Option<String>) -> Self {
        name.map(Namespace::new).unwrap_or(Namespace::Disabled)
    }
}

impl From<Option<&str>> for Namespace {
    fn from(name: Option<&str>) -> Self {
        name.map(Namespace::new).unwrap_or(Namespace::Disabled)
    }
}

impl From<Namespace> for Option<String> {
    fn from(namespace: Namespace) -> Self {
        match namespace {
            Namespace::Disabled => None,
            Namespace::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("<none>"))
    }
}
