//! Session storage capability
//!
//! Widgets never reach into ambient session state. They receive a
//! [`SessionStore`] and address it through a caller-supplied section key,
//! so two differently scoped widgets never share a slot.

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Per-user key-value storage for small structured values
pub trait SessionStore: Send + Sync {
    /// Read a value from `section`
    fn get(&self, section: &str, key: &str) -> Option<serde_json::Value>;

    /// Write a value into `section`, replacing any previous value
    fn set(&self, section: &str, key: &str, value: serde_json::Value);

    /// Remove a value from `section`, returning it
    fn remove(&self, section: &str, key: &str) -> Option<serde_json::Value>;
}

/// In-process session store, one map per section
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sections: Mutex<HashMap<String, HashMap<String, serde_json::Value>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all sections, for persisting elsewhere
    pub fn snapshot(&self) -> HashMap<String, HashMap<String, serde_json::Value>> {
        self.sections.lock().clone()
    }

    /// Build a store pre-populated from a snapshot
    pub fn from_snapshot(sections: HashMap<String, HashMap<String, serde_json::Value>>) -> Self {
        Self {
            sections: Mutex::new(sections),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, section: &str, key: &str) -> Option<serde_json::Value> {
        self.sections
            .lock()
            .get(section)
            .and_then(|values| values.get(key))
            .cloned()
    }

    fn set(&self, section: &str, key: &str, value: serde_json::Value) {
        self.sections
            .lock()
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    fn remove(&self, section: &str, key: &str) -> Option<serde_json::Value> {
        self.sections
            .lock()
            .get_mut(section)
            .and_then(|values| values.remove(key))
    }
}

/// Typed view over one section of a [`SessionStore`]
pub struct SessionSection<'a> {
    store: &'a dyn SessionStore,
    name: String,
}

impl<'a> SessionSection<'a> {
    pub fn new(store: &'a dyn SessionStore, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// Section key this view reads and writes
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read and deserialize a value.
    ///
    /// A stored value of the wrong shape reads as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(&self.name, key)?;
        match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(section = %self.name, key, error = %e, "ignoring malformed session value");
                None
            }
        }
    }

    /// Serialize and store a value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(raw) => self.store.set(&self.name, key, raw),
            Err(e) => {
                tracing::warn!(section = %self.name, key, error = %e, "failed to serialize session value");
            }
        }
    }

    pub fn remove(&self, key: &str) {
        self.store.remove(&self.name, key);
    }
}
