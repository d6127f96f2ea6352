//! JSON-file settings store.
//!
//! The file holds one object per group:
//!
//! ```json
//! {
//!   "FocusAutoSave": { "SaveFiles": "True", "SaveProjects": "False" }
//! }
//! ```
//!
//! Every write replaces the whole file through a temporary file in the same
//! directory, so each key is durable as soon as `set_string` returns and a
//! crash mid-write leaves the previous contents intact. A file that cannot
//! be parsed is treated as empty, and the next write replaces it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{SettingsStore, StoreError};

type Document = BTreeMap<String, BTreeMap<String, String>>;

/// Settings store persisted to a JSON file.
#[derive(Debug)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl JsonFileSettingsStore {
    /// Open a store at `path`. The file is created on first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Document, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Document::new());
        }
        match serde_json::from_str(&text) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "unreadable settings file, starting from an empty document"
                );
                Ok(Document::new())
            }
        }
    }

    fn write_document(&self, doc: &Document) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, doc)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn locked<T>(&self, f: impl FnOnce() -> Result<T, StoreError>) -> Result<T, StoreError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StoreError::Unavailable("settings file lock poisoned".to_string()))?;
        f()
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn group_exists(&self, group: &str) -> Result<bool, StoreError> {
        self.locked(|| Ok(self.read_document()?.contains_key(group)))
    }

    fn create_group(&self, group: &str) -> Result<(), StoreError> {
        self.locked(|| {
            let mut doc = self.read_document()?;
            if doc.contains_key(group) {
                return Ok(());
            }
            doc.insert(group.to_string(), BTreeMap::new());
            self.write_document(&doc)
        })
    }

    fn get_string(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        self.locked(|| {
            let doc = self.read_document()?;
            Ok(doc.get(group).and_then(|g| g.get(key)).cloned())
        })
    }

    fn set_string(&self, group: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.locked(|| {
            let mut doc = self.read_document()?;
            let entry = doc
                .get_mut(group)
                .ok_or_else(|| StoreError::GroupNotFound(group.to_string()))?;
            entry.insert(key.to_string(), value.to_string());
            self.write_document(&doc)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::policy::{DEFAULT_GROUP, PolicyFlags, PolicyStore, SAVE_FILES_KEY};

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = JsonFileSettingsStore::open(&path);
        assert!(!store.group_exists("g").unwrap());
        store.create_group("g").unwrap();
        store.set_string("g", "SaveFiles", "False").unwrap();

        let reopened = JsonFileSettingsStore::open(&path);
        assert!(reopened.group_exists("g").unwrap());
        assert_eq!(
            reopened.get_string("g", "SaveFiles").unwrap().as_deref(),
            Some("False")
        );
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettingsStore::open(dir.path().join("absent.json"));
        assert_eq!(store.get_string("g", "k").unwrap(), None);
    }

    #[test]
    fn test_torn_file_recovers_on_next_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"FocusAutoSave": {"SaveFiles": "Fal"#).unwrap();

        let settings = Arc::new(JsonFileSettingsStore::open(&path));
        assert_eq!(settings.get_string(DEFAULT_GROUP, SAVE_FILES_KEY).unwrap(), None);

        let store = PolicyStore::new(settings.clone());
        assert_eq!(store.load(), PolicyFlags::default());
        let flags = PolicyFlags {
            save_documents: false,
            save_projects: true,
            ..PolicyFlags::default()
        };
        assert_eq!(store.save(&flags), 0);
        assert_eq!(PolicyStore::new(settings).load(), flags);

        // Only the settings file is left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_create_group_keeps_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettingsStore::open(dir.path().join("s.json"));
        store.create_group("g").unwrap();
        store.set_string("g", "k", "v").unwrap();
        store.create_group("g").unwrap();
        assert_eq!(store.get_string("g", "k").unwrap().as_deref(), Some("v"));
    }
}
