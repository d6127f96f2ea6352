//! Loading and persisting [`PolicyFlags`] through a [`SettingsStore`].

use std::sync::Arc;

use super::flags::{
    FocusCommands, HostCommand, LOST_DOC_FOCUS_CMD_ARGS_KEY, LOST_DOC_FOCUS_CMD_KEY,
    LOST_FOCUS_CMD_ARGS_KEY, LOST_FOCUS_CMD_KEY, PolicyFlags, SAVE_FILES_KEY, SAVE_PROJECTS_KEY,
    SAVE_SINGLE_DOCUMENT_KEY, SAVE_SOLUTIONS_KEY, format_bool, parse_bool,
};
use crate::settings::{SettingsStore, StoreError};
use crate::status::StatusLog;

/// Default settings group the flags live under.
pub const DEFAULT_GROUP: &str = "FocusAutoSave";

/// Reads and writes policy flags.
///
/// Loading never fails: absent or malformed values fall back to the
/// per-flag defaults of [`PolicyFlags::default`]. Saving is best-effort and
/// key-by-key; a failed key is reported and the rest are still written.
pub struct PolicyStore<S: SettingsStore + ?Sized> {
    store: Arc<S>,
    group: String,
    commands_enabled: bool,
    status: StatusLog,
}

impl<S: SettingsStore + ?Sized> std::fmt::Debug for PolicyStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStore")
            .field("group", &self.group)
            .field("commands_enabled", &self.commands_enabled)
            .finish_non_exhaustive()
    }
}

impl<S: SettingsStore + ?Sized> Clone for PolicyStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            group: self.group.clone(),
            commands_enabled: self.commands_enabled,
            status: self.status.clone(),
        }
    }
}

impl<S: SettingsStore + ?Sized> PolicyStore<S> {
    /// Create a policy store over `store` using [`DEFAULT_GROUP`].
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            group: DEFAULT_GROUP.to_string(),
            commands_enabled: false,
            status: StatusLog::detached(),
        }
    }

    /// Use a different settings group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Enable the custom focus command capability.
    pub fn with_commands(mut self, enabled: bool) -> Self {
        self.commands_enabled = enabled;
        self
    }

    /// Report write failures to `status`.
    pub fn with_status(mut self, status: StatusLog) -> Self {
        self.status = status;
        self
    }

    /// Whether loaded flags carry the command capability.
    pub fn commands_enabled(&self) -> bool {
        self.commands_enabled
    }

    /// The settings group in use.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Load the current flags.
    pub fn load(&self) -> PolicyFlags {
        match self.try_load() {
            Ok(flags) => flags,
            Err(e) => {
                tracing::warn!(error = %e, group = %self.group, "failed to load policy, using defaults");
                self.defaults()
            }
        }
    }

    /// Persist `flags`, returning the number of keys that failed to write.
    pub fn save(&self, flags: &PolicyFlags) -> usize {
        let mut failed = 0;
        for (key, value) in self.encode(flags) {
            if let Err(e) = self.store.set_string(&self.group, key, &value) {
                failed += 1;
                self.status.line(format!("Failed to save setting {key}: {e}"));
            }
        }
        if failed == 0 {
            tracing::debug!(group = %self.group, "policy saved");
        }
        failed
    }

    fn defaults(&self) -> PolicyFlags {
        PolicyFlags {
            commands: self.commands_enabled.then(FocusCommands::default),
            ..PolicyFlags::default()
        }
    }

    fn try_load(&self) -> Result<PolicyFlags, StoreError> {
        if !self.store.group_exists(&self.group)? {
            self.initialize_group()?;
        }

        let defaults = self.defaults();
        let mut flags = PolicyFlags {
            save_documents: self.read_flag(SAVE_FILES_KEY, defaults.save_documents)?,
            save_projects: self.read_flag(SAVE_PROJECTS_KEY, defaults.save_projects)?,
            save_solution: self.read_flag(SAVE_SOLUTIONS_KEY, defaults.save_solution)?,
            save_single_document: self
                .read_flag(SAVE_SINGLE_DOCUMENT_KEY, defaults.save_single_document)?,
            commands: None,
        };

        if self.commands_enabled {
            flags.commands = Some(FocusCommands {
                lost_focus: self.read_command(LOST_FOCUS_CMD_KEY, LOST_FOCUS_CMD_ARGS_KEY)?,
                doc_focus: self
                    .read_command(LOST_DOC_FOCUS_CMD_KEY, LOST_DOC_FOCUS_CMD_ARGS_KEY)?,
            });
        }
        Ok(flags)
    }

    fn initialize_group(&self) -> Result<(), StoreError> {
        tracing::info!(group = %self.group, "creating settings group with defaults");
        self.store.create_group(&self.group)?;
        for (key, value) in self.encode(&self.defaults()) {
            self.store.set_string(&self.group, key, &value)?;
        }
        Ok(())
    }

    fn read_flag(&self, key: &str, default: bool) -> Result<bool, StoreError> {
        let raw = self.store.get_string(&self.group, key)?;
        Ok(match raw.as_deref().map(|v| (v, parse_bool(v))) {
            Some((_, Some(value))) => value,
            Some((v, None)) => {
                tracing::warn!(key, value = %v, default, "malformed policy flag, using default");
                default
            }
            None => default,
        })
    }

    fn read_command(
        &self,
        name_key: &str,
        args_key: &str,
    ) -> Result<Option<HostCommand>, StoreError> {
        let name = self.store.get_string(&self.group, name_key)?;
        let args = self.store.get_string(&self.group, args_key)?;
        Ok(HostCommand::from_stored(name.as_deref(), args.as_deref()))
    }

    fn encode(&self, flags: &PolicyFlags) -> Vec<(&'static str, String)> {
        let mut entries: Vec<(&'static str, String)> = flags
            .flag_entries()
            .into_iter()
            .map(|(key, value)| (key, format_bool(value).to_string()))
            .collect();

        if self.commands_enabled {
            let commands = flags.commands.clone().unwrap_or_default();
            let split = |cmd: Option<HostCommand>| {
                cmd.map(|c| (c.name, c.args)).unwrap_or_default()
            };
            let (lost, lost_args) = split(commands.lost_focus);
            let (doc, doc_args) = split(commands.doc_focus);
            entries.push((LOST_FOCUS_CMD_KEY, lost));
            entries.push((LOST_FOCUS_CMD_ARGS_KEY, lost_args));
            entries.push((LOST_DOC_FOCUS_CMD_KEY, doc));
            entries.push((LOST_DOC_FOCUS_CMD_ARGS_KEY, doc_args));
        }
        entries
    }
}
