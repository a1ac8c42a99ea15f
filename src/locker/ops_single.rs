//! Contains the per-key operations of the `Locker`: put, add, get, has, forget, pull.
use super::Locker;
use crate::types::{Entries, Keys, PutValue, Retrieved};
use crate::Result;
use serde_json::{Map, Value};

impl Locker {
    /// Stores a value.
    ///
    /// `entries` is either a single key, whose value comes from `value`, or a
    /// mapping of keys to values, in which case `value` is ignored. Returns
    /// `Ok(false)` without touching storage when the key is empty or the value
    /// is [`PutValue::Absent`].
    ///
    /// A [`PutValue::Producer`] receives the currently stored value and its
    /// result is stored, giving a read-modify-write in one call.
    ///
    /// For a mapping, the first failing key aborts the call; keys written
    /// before it stay written.
    pub fn put<'a>(
        &self,
        entries: impl Into<Entries<'a>>,
        value: impl Into<PutValue<'a>>,
    ) -> Result<bool> {
        self.store(entries.into(), value.into(), None, false)
    }

    /// Like [`put`](Self::put), but a producer receives `fallback` when the
    /// item is absent.
    pub fn put_with_default<'a>(
        &self,
        entries: impl Into<Entries<'a>>,
        value: impl Into<PutValue<'a>>,
        fallback: impl Into<Value>,
    ) -> Result<bool> {
        self.store(entries.into(), value.into(), Some(fallback.into()), false)
    }

    /// Stores a value only if the key is absent. Never overwrites.
    ///
    /// For a mapping, every absent key is written. Returns whether anything
    /// was written.
    pub fn add<'a>(
        &self,
        entries: impl Into<Entries<'a>>,
        value: impl Into<PutValue<'a>>,
    ) -> Result<bool> {
        self.store(entries.into(), value.into(), None, true)
    }

    /// Like [`add`](Self::add), with a fallback for producers.
    pub fn add_with_default<'a>(
        &self,
        entries: impl Into<Entries<'a>>,
        value: impl Into<PutValue<'a>>,
        fallback: impl Into<Value>,
    ) -> Result<bool> {
        self.store(entries.into(), value.into(), Some(fallback.into()), true)
    }

    fn store(
        &self,
        entries: Entries<'_>,
        value: PutValue<'_>,
        fallback: Option<Value>,
        only_absent: bool,
    ) -> Result<bool> {
        match entries {
            Entries::Producer(producer) => self.store(producer(), value, fallback, only_absent),
            Entries::Map(map) => {
                let mut written = false;
                for (key, value) in map {
                    if only_absent && self.core.exists(&key)? {
                        continue;
                    }
                    self.core.write_item(&key, value)?;
                    written = true;
                }
                Ok(written || !only_absent)
            }
            Entries::One(key) => {
                if key.is_empty() {
                    return Ok(false);
                }
                if only_absent && self.core.exists(&key)? {
                    return Ok(false);
                }
                let value = match value {
                    PutValue::Absent => return Ok(false),
                    PutValue::Value(value) => value,
                    PutValue::Producer(producer) => {
                        let current = self.core.read_item(&key)?.or(fallback);
                        producer(current)
                    }
                };
                self.core.write_item(&key, value)?;
                Ok(true)
            }
        }
    }

    /// Reads the item stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        self.core.read_item(key)
    }

    /// Reads the item stored under `key`, or returns `default` when absent.
    ///
    /// Falsy defaults such as `false`, `0` or `null` are returned as given.
    pub fn get_or(&self, key: &str, default: impl Into<Value>) -> Result<Value> {
        Ok(self.core.read_item(key)?.unwrap_or_else(|| default.into()))
    }

    /// Reads one key or several.
    ///
    /// A single key yields [`Retrieved::Item`] holding the stored value, else
    /// `default` when it is `Some`, else `None`. `Some(Value::Null)` is an
    /// explicit null default, distinct from passing no default. Several keys
    /// yield [`Retrieved::Items`] holding only the present keys; `default` is
    /// ignored for them.
    pub fn retrieve<'a>(
        &self,
        keys: impl Into<Keys<'a>>,
        default: Option<Value>,
    ) -> Result<Retrieved> {
        match keys.into() {
            Keys::Producer(producer) => self.retrieve(producer(), default),
            Keys::One(key) => Ok(Retrieved::Item(self.core.read_item(&key)?.or(default))),
            Keys::Many(keys) => Ok(Retrieved::Items(self.get_many(&keys)?)),
        }
    }

    /// Checks whether an item exists. Several keys exist when all of them do.
    pub fn has<'a>(&self, keys: impl Into<Keys<'a>>) -> Result<bool> {
        match keys.into() {
            Keys::Producer(producer) => self.has(producer()),
            Keys::One(key) => self.core.exists(&key),
            Keys::Many(keys) => {
                for key in &keys {
                    if !self.core.exists(key)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// Removes one or several items. Missing keys are skipped.
    pub fn forget<'a>(&self, keys: impl Into<Keys<'a>>) -> Result<&Self> {
        match keys.into() {
            Keys::Producer(producer) => return self.forget(producer()),
            Keys::One(key) => {
                self.core.remove_item(&key)?;
            }
            Keys::Many(keys) => {
                for key in &keys {
                    self.core.remove_item(key)?;
                }
            }
        }
        Ok(self)
    }

    /// Reads one key or several, then removes them.
    pub fn pull<'a>(&self, keys: impl Into<Keys<'a>>, default: Option<Value>) -> Result<Retrieved> {
        match keys.into() {
            Keys::Producer(producer) => self.pull(producer(), default),
            Keys::One(key) => {
                let value = self.core.read_item(&key)?.or(default);
                self.core.remove_item(&key)?;
                Ok(Retrieved::Item(value))
            }
            Keys::Many(keys) => {
                let items = self.get_many(&keys)?;
                self.forget(keys)?;
                Ok(Retrieved::Items(items))
            }
        }
    }

    /// Reads several keys, omitting the absent ones.
    pub fn get_many<I, S>(&self, keys: I) -> Result<Map<String, Value>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items = Map::new();
        for key in keys {
            let key = key.as_ref();
            if let Some(value) = self.core.read_item(key)? {
                items.insert(key.to_string(), value);
            }
        }
        Ok(items)
    }
}
