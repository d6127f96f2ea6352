//! In-memory settings store.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use super::{SettingsStore, StoreError};

type Groups = HashMap<String, BTreeMap<String, String>>;

/// Settings store backed by a map in process memory.
///
/// Writes can be made to fail with [`MemorySettingsStore::fail_writes`],
/// which lets callers exercise best-effort persistence paths.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    groups: RwLock<Groups>,
    failing_keys: RwLock<Vec<String>>,
}

impl MemorySettingsStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a group with values.
    pub fn with_group<I, K, V>(self, group: &str, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if let Ok(mut groups) = self.groups.write() {
            let entry = groups.entry(group.to_string()).or_default();
            for (k, v) in values {
                entry.insert(k.into(), v.into());
            }
        }
        self
    }

    /// Make writes to `key` fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, key: &str) {
        if let Ok(mut keys) = self.failing_keys.write() {
            keys.push(key.to_string());
        }
    }

    /// Copy of a group's contents, if it exists.
    pub fn group(&self, group: &str) -> Option<BTreeMap<String, String>> {
        self.groups.read().ok()?.get(group).cloned()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("settings lock poisoned".to_string())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn group_exists(&self, group: &str) -> Result<bool, StoreError> {
        let groups = self.groups.read().map_err(|_| Self::poisoned())?;
        Ok(groups.contains_key(group))
    }

    fn create_group(&self, group: &str) -> Result<(), StoreError> {
        let mut groups = self.groups.write().map_err(|_| Self::poisoned())?;
        groups.entry(group.to_string()).or_default();
        Ok(())
    }

    fn get_string(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        let groups = self.groups.read().map_err(|_| Self::poisoned())?;
        Ok(groups.get(group).and_then(|g| g.get(key)).cloned())
    }

    fn set_string(&self, group: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let failing = self.failing_keys.read().map_err(|_| Self::poisoned())?;
        if failing.iter().any(|k| k == key) {
            return Err(StoreError::Unavailable(format!("write to {key} rejected")));
        }
        drop(failing);

        let mut groups = self.groups.write().map_err(|_| Self::poisoned())?;
        let entry = groups
            .get_mut(group)
            .ok_or_else(|| StoreError::GroupNotFound(group.to_string()))?;
        entry.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
