//! Contains the binding operations of the `Locker`.
use super::Locker;
use crate::binding::{BindingId, PropertyHost};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

impl Locker {
    /// Binds the item `key` to the property of the same name on `host`.
    ///
    /// If the property is unset it is seeded from storage; when the item is
    /// absent too, `default` seeds both. Every later change of the property is
    /// written back. Binding the same key on the same host again replaces the
    /// previous watcher.
    pub fn bind<H>(&self, host: &H, key: &str, default: Option<Value>) -> Result<&Self>
    where
        H: PropertyHost + ?Sized,
    {
        if host.read(key).is_none() {
            match self.core.read_item(key)? {
                Some(stored) => host.write(key, Some(stored)),
                None => {
                    host.write(key, default.clone());
                    if let Some(default) = default {
                        self.core.write_item(key, default)?;
                    }
                }
            }
        }

        let core = Arc::clone(&self.core);
        let property = key.to_string();
        let handle = host.watch(
            key,
            Box::new(move |value: Option<&Value>| {
                let Some(value) = value else { return };
                if let Err(err) = core.write_item(&property, value.clone()) {
                    tracing::error!(key = %property, error = %err, "failed to store bound property");
                }
            }),
        );

        let id = BindingId::new(&host.owner_id(), key);
        let previous = self.bindings.lock().insert(id, handle);
        if let Some(previous) = previous {
            host.unwatch(previous);
        }
        Ok(self)
    }

    /// Unsets the property, removes the item and deregisters the watcher.
    pub fn unbind<H>(&self, host: &H, key: &str) -> Result<&Self>
    where
        H: PropertyHost + ?Sized,
    {
        host.write(key, None);
        self.core.remove_item(key)?;

        let id = BindingId::new(&host.owner_id(), key);
        let handle = self.bindings.lock().remove(&id);
        if let Some(handle) = handle {
            host.unwatch(handle);
        }
        Ok(self)
    }

    /// Checks whether `key` is bound on `host` by this locker.
    pub fn is_bound<H>(&self, host: &H, key: &str) -> bool
    where
        H: PropertyHost + ?Sized,
    {
        self.bindings
            .lock()
            .contains(&BindingId::new(&host.owner_id(), key))
    }

    /// Number of active bindings held by this locker.
    pub fn binding_count(&self) -> usize {
        self.bindings.lock().len()
    }
}
