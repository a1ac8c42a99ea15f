//! Two-way binding between stored items and properties of an external owner.
//!
//! The owner is anything implementing [`PropertyHost`]: it can read and write
//! named properties and notify watchers when a property changes. A `Locker`
//! seeds the property from storage and writes every later change back.
use crate::types::HashUtils;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback invoked by a host with the property's new value.
pub type WatchCallback = Box<dyn Fn(Option<&Value>) + Send + Sync>;

/// Handle returned by [`PropertyHost::watch`], used to deregister a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub u64);

/// An owner of named, observable properties.
pub trait PropertyHost {
    /// Identity of the owner, stable for its lifetime.
    fn owner_id(&self) -> String;

    /// Current value of `property`; `None` when unset.
    fn read(&self, property: &str) -> Option<Value>;

    /// Assigns `property`; `None` unsets it.
    fn write(&self, property: &str, value: Option<Value>);

    /// Registers `callback` to run whenever `property` changes.
    fn watch(&self, property: &str, callback: WatchCallback) -> WatchHandle;

    /// Deregisters a watcher. Unknown handles are ignored.
    fn unwatch(&self, handle: WatchHandle);
}

/// Identifies a binding by owner and logical key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId([u8; 32]);

impl BindingId {
    /// Derives the id for `key` bound on the owner identified by `owner_id`.
    pub fn new(owner_id: &str, key: &str) -> Self {
        Self(HashUtils::hash(&format!("{owner_id}\u{0}{key}")))
    }
}

impl fmt::Debug for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingId(")?;
        for byte in &self.0[..6] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Active watchers of one `Locker`, at most one per binding id.
#[derive(Debug, Default)]
pub(crate) struct BindingRegistry {
    watchers: HashMap<BindingId, WatchHandle>,
}

impl BindingRegistry {
    /// Records `handle`, returning the handle it replaces.
    pub(crate) fn insert(&mut self, id: BindingId, handle: WatchHandle) -> Option<WatchHandle> {
        self.watchers.insert(id, handle)
    }

    pub(crate) fn remove(&mut self, id: &BindingId) -> Option<WatchHandle> {
        self.watchers.remove(id)
    }

    pub(crate) fn contains(&self, id: &BindingId) -> bool {
        self.watchers.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.watchers.len()
    }
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Default)]
struct ScopeState {
    values: HashMap<String, Value>,
    watchers: HashMap<u64, (String, Arc<WatchCallback>)>,
    next_handle: u64,
}

/// A simple in-process [`PropertyHost`].
///
/// [`Scope::set`] assigns a property and runs its watchers, while
/// [`PropertyHost::write`] assigns silently.
pub struct Scope {
    id: u64,
    state: Mutex<ScopeState>,
}

impl Scope {
    /// Creates an empty scope with a process-unique id.
    pub fn new() -> Self {
        Self {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::SeqCst),
            state: Mutex::new(ScopeState::default()),
        }
    }

    /// Current value of `property`.
    pub fn get(&self, property: &str) -> Option<Value> {
        self.state.lock().values.get(property).cloned()
    }

    /// Assigns `property` and notifies its watchers.
    pub fn set(&self, property: &str, value: impl Into<Value>) {
        let value = value.into();
        let callbacks: Vec<Arc<WatchCallback>> = {
            let mut state = self.state.lock();
            state.values.insert(property.to_string(), value.clone());
            state
                .watchers
                .values()
                .filter(|(watched, _)| watched == property)
                .map(|(_, callback)| Arc::clone(callback))
                .collect()
        };
        // Run outside the lock; a callback may read the scope.
        for callback in callbacks {
            callback(Some(&value));
        }
    }

    /// Number of registered watchers.
    pub fn watcher_count(&self) -> usize {
        self.state.lock().watchers.len()
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("values", &state.values)
            .field("watchers", &state.watchers.len())
            .finish()
    }
}

impl PropertyHost for Scope {
    fn owner_id(&self) -> String {
        format!("scope-{}", self.id)
    }

    fn read(&self, property: &str) -> Option<Value> {
        self.get(property)
    }

    fn write(&self, property: &str, value: Option<Value>) {
        let mut state = self.state.lock();
        match value {
            Some(value) => state.values.insert(property.to_string(), value),
            None => state.values.remove(property),
        };
    }

    fn watch(&self, property: &str, callback: WatchCallback) -> WatchHandle {
        let mut state = self.state.lock();
        state.next_handle += 1;
        let handle = state.next_handle;
        state
            .watchers
            .insert(handle, (property.to_string(), Arc::new(callback)));
        WatchHandle(handle)
    }

    fn unwatch(&self, handle: WatchHandle) {
        self.state.lock().watchers.remove(&handle.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_binding_id_depends_on_owner_and_key() {
        assert_eq!(BindingId::new("scope-1", "foo"), BindingId::new("scope-1", "foo"));
        assert_ne!(BindingId::new("scope-1", "foo"), BindingId::new("scope-2", "foo"));
        assert_ne!(BindingId::new("scope-1", "foo"), BindingId::new("scope-1", "bar"));
        // The separator keeps concatenations apart.
        assert_ne!(BindingId::new("scope-1", "1foo"), BindingId::new("scope-11", "foo"));
    }

    #[test]
    fn test_registry_replaces_handles() {
        let mut registry = BindingRegistry::default();
        let id = BindingId::new("owner", "key");
        assert_eq!(registry.insert(id, WatchHandle(1)), None);
        assert_eq!(registry.insert(id, WatchHandle(2)), Some(WatchHandle(1)));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&id));
        assert_eq!(registry.remove(&id), Some(WatchHandle(2)));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_scope_set_notifies_watchers() {
        let scope = Scope::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = {
            let calls = Arc::clone(&calls);
            scope.watch(
                "foo",
                Box::new(move |value: Option<&Value>| {
                    assert_eq!(value, Some(&json!("bar")));
                    calls.fetch_add(1, Ordering::SeqCst);
                }),
            )
        };

        scope.set("foo", "bar");
        scope.set("other", 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        scope.unwatch(handle);
        scope.set("foo", "bar");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(scope.watcher_count(), 0);
    }

    #[test]
    fn test_scope_write_is_silent() {
        let scope = Scope::new();
        let calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = Arc::clone(&calls);
            scope.watch(
                "foo",
                Box::new(move |_: Option<&Value>| {
                    calls.fetch_add(1, Ordering::SeqCst);
                }),
            );
        }

        scope.write("foo", Some(json!(1)));
        assert_eq!(scope.read("foo"), Some(json!(1)));
        scope.write("foo", None);
        assert_eq!(scope.read("foo"), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scopes_have_distinct_owner_ids() {
        assert_ne!(Scope::new().owner_id(), Scope::new().owner_id());
    }
}
