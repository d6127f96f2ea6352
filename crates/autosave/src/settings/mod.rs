//! Durable key/value settings storage.
//!
//! The policy store reads and writes its flags through [`SettingsStore`],
//! scoped under a group name. Two implementations ship with the crate:
//!
//! - [`MemorySettingsStore`] - process-local, for tests and embedding
//! - [`JsonFileSettingsStore`] - one JSON object per group in a single file

mod file;
mod memory;

use thiserror::Error;

pub use file::JsonFileSettingsStore;
pub use memory::MemorySettingsStore;

/// Errors raised by a settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing service is not available (e.g. during shutdown)
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
    /// The requested group does not exist
    #[error("settings group not found: {0}")]
    GroupNotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The backing file could not be parsed or written
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Namespaced string key/value store.
///
/// Values are opaque strings; interpretation (booleans, commands) is left
/// to the caller.
pub trait SettingsStore: Send + Sync {
    /// Returns true if the group has been created.
    fn group_exists(&self, group: &str) -> Result<bool, StoreError>;

    /// Create an empty group. Creating an existing group is a no-op.
    fn create_group(&self, group: &str) -> Result<(), StoreError>;

    /// Read a value. Absent keys yield `Ok(None)`.
    fn get_string(&self, group: &str, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set_string(&self, group: &str, key: &str, value: &str) -> Result<(), StoreError>;
}

impl SettingsStore for std::sync::Arc<dyn SettingsStore> {
    fn group_exists(&self, group: &str) -> Result<bool, StoreError> {
        (**self).group_exists(group)
    }

    fn create_group(&self, group: &str) -> Result<(), StoreError> {
        (**self).create_group(group)
    }

    fn get_string(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_string(group, key)
    }

    fn set_string(&self, group: &str, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_string(group, key, value)
    }
}
