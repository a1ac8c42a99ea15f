//! Change notifications emitted by a `Locker`.
use crate::namespace::Namespace;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// What happened to an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// The key did not exist before the write.
    Added {
        /// The stored value.
        value: Value,
    },
    /// The key existed and was overwritten.
    Updated {
        /// The value read before the write.
        old_value: Value,
        /// The stored value.
        new_value: Value,
    },
    /// The key was removed.
    Forgotten,
}

/// A change to a single item, tagged with where it happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockerEvent {
    /// The change itself.
    #[serde(flatten)]
    pub kind: EventKind,
    /// Logical key of the item.
    pub key: String,
    /// Name of the driver the item lives in.
    pub driver: String,
    /// Namespace of the Locker that made the change.
    pub namespace: Namespace,
}

impl LockerEvent {
    /// Event name, e.g. `locker.item.added`.
    pub fn name(&self) -> &'static str {
        match self.kind {
            EventKind::Added { .. } => "locker.item.added",
            EventKind::Updated { .. } => "locker.item.updated",
            EventKind::Forgotten => "locker.item.forgotten",
        }
    }
}

/// Receives change events. Emission is fire-and-forget.
pub trait EventSink: Send + Sync {
    /// Handles one event.
    fn emit(&self, event: &LockerEvent);
}

impl<F> EventSink for F
where
    F: Fn(&LockerEvent) + Send + Sync,
{
    fn emit(&self, event: &LockerEvent) {
        self(event)
    }
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &LockerEvent) {}
}

/// Shared handle to an [`EventSink`] that isolates the caller from sink panics.
#[derive(Clone)]
pub(crate) struct Emitter {
    sink: Arc<dyn EventSink>,
}

impl Emitter {
    pub(crate) fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn emit(&self, event: LockerEvent) {
        tracing::trace!(event = event.name(), key = %event.key, "emitting locker event");
        let sink = &self.sink;
        if panic::catch_unwind(AssertUnwindSafe(|| sink.emit(&event))).is_err() {
            tracing::warn!(event = event.name(), key = %event.key, "event sink panicked");
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(Arc::new(NullSink))
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").finish_non_exhaustive()
    }
}
