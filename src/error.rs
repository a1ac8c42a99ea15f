//! Defines the custom error types and `Result` alias for the crate.
use thiserror::Error;

/// Errors reported by a storage [`Driver`](crate::driver::Driver).
#[derive(Error, Debug)]
pub enum DriverError {
    /// The backend refused the write because its capacity is exhausted.
    #[error("Storage quota exceeded: {limit}")]
    QuotaExceeded {
        /// Human readable description of the limit that was hit.
        limit: String,
    },

    /// The backend cannot be used in the current environment.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// An I/O error raised by a file-backed driver.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// The on-disk snapshot could not be encoded or decoded.
    #[error("Snapshot error")]
    Snapshot(#[from] bincode::Error),
}

impl DriverError {
    /// Returns `true` if this error signals an exhausted capacity.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, DriverError::QuotaExceeded { .. })
    }
}

/// The primary error type for all fallible operations in the `locker` library.
#[derive(Error, Debug)]
pub enum LockerError {
    /// The requested driver name is not registered.
    #[error("The driver '{0}' was not found")]
    DriverNotFound(String),

    /// The capability probe determined the backend is unusable.
    #[error("The storage driver '{driver}' is not supported in this environment")]
    UnsupportedBackend {
        /// Name of the driver that failed the probe.
        driver: String,
    },

    /// A write failed because the backend's capacity is exhausted.
    #[error("The storage quota has been exceeded while writing '{key}'")]
    QuotaExceeded {
        /// Logical key of the item being written.
        key: String,
    },

    /// Any other write failure.
    #[error("Could not add item with key '{key}'")]
    Write {
        /// Logical key of the item being written.
        key: String,
        /// The underlying driver failure.
        #[source]
        source: DriverError,
    },

    /// A read, remove or clear call failed inside the driver.
    #[error("Storage backend error")]
    Backend(#[source] DriverError),

    /// An I/O error raised while preparing persistence.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl LockerError {
    /// Maps a failed `set` into the write error taxonomy.
    pub(crate) fn from_write(key: &str, source: DriverError) -> Self {
        if source.is_quota_exceeded() {
            LockerError::QuotaExceeded {
                key: key.to_string(),
            }
        } else {
            LockerError::Write {
                key: key.to_string(),
                source,
            }
        }
    }
}

impl From<DriverError> for LockerError {
    fn from(err: DriverError) -> Self {
        LockerError::Backend(err)
    }
}

/// A specialized `Result` type for Locker operations.
pub type Result<T> = std::result::Result<T, LockerError>;
