//! Locker - namespaced key/value storage
//!
//! A small storage façade over pluggable string backends. Values are encoded
//! as JSON on the way in and decoded on the way out, keys are prefixed with a
//! namespace, and every write or removal can be reported as a change event.
//!
//! # Features
//!
//! - **Pluggable Drivers**: `local` and `session` built in, custom backends via the [`Driver`] trait
//! - **Namespaces**: Isolate keys of different clients sharing one backend
//! - **Bulk Operations**: Store, fetch and remove many items in one call
//! - **Deferred Values**: Compute keys and values lazily from the stored state
//! - **Persistence**: Optional file-backed `local` driver with bincode snapshots
//! - **Change Events**: `locker.item.added`, `locker.item.updated` and `locker.item.forgotten`
//! - **Two-way Binding**: Keep a property of any [`PropertyHost`] in sync with storage
//!
//! # Quick Start
//!
//! ```rust
//! use locker::{Locker, Result};
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let locker = Locker::builder().namespace("myApp").build()?;
//!
//!     locker.put("user", json!({ "name": "Ada", "admin": true }))?;
//!     assert_eq!(locker.get("user")?, Some(json!({ "name": "Ada", "admin": true })));
//!
//!     // The same keys in another namespace are independent.
//!     let other = locker.namespace("otherApp");
//!     assert!(!other.has("user")?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Bulk Operations
//!
//! ```rust
//! use locker::{Entries, Locker, PutValue, Result};
//! use serde_json::json;
//!
//! fn bulk_example(locker: &Locker) -> Result<()> {
//!     locker.put(
//!         [("foo", json!("bar")), ("baz", json!([1, 2, 3]))]
//!             .into_iter()
//!             .collect::<Entries>(),
//!         PutValue::Absent,
//!     )?;
//!
//!     let items = locker.get_many(["foo", "baz"])?;
//!     assert_eq!(items.len(), 2);
//!
//!     locker.forget(["foo", "baz"])?;
//!     Ok(())
//! }
//! # bulk_example(&Locker::builder().build().unwrap()).unwrap();
//! ```

pub mod binding;
pub mod codec;
pub mod config;
pub mod data_table;
pub mod driver;
pub mod error;
pub mod events;
pub mod locker;
pub mod namespace;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use binding::{BindingId, PropertyHost, Scope, WatchCallback, WatchHandle};
pub use config::LockerConfig;
pub use driver::{Driver, DriverRegistry, DriverResult, FileDriver, MemoryDriver, StorageQuota};
pub use error::{DriverError, LockerError, Result};
pub use events::{EventKind, EventSink, LockerEvent, NullSink};
pub use locker::Locker;
pub use namespace::Namespace;
pub use provider::LockerProvider;
pub use types::*;
