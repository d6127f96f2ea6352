//! Autosave policy: flags, persistence and live UI state.
//!
//! ## Storage layout
//!
//! Flags are stored as strings under one settings group
//! ([`DEFAULT_GROUP`] unless overridden):
//!
//! | key                  | flag                     | default |
//! |----------------------|--------------------------|---------|
//! | `SaveFiles`          | `save_documents`         | `True`  |
//! | `SaveProjects`       | `save_projects`          | `False` |
//! | `SaveSolutions`      | `save_solution`          | `False` |
//! | `SaveSingleDocument` | `save_single_document`   | `False` |
//!
//! With the command capability enabled, `LostFocusCmd`, `LostFocusCmdArgs`,
//! `LostDocFocusCmd` and `LostDocFocusCmdArgs` hold the custom commands.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use autosave::policy::PolicyStore;
//! use autosave::settings::MemorySettingsStore;
//!
//! let store = PolicyStore::new(Arc::new(MemorySettingsStore::new()));
//! let mut flags = store.load();
//! flags.save_projects = true;
//! store.save(&flags);
//! ```

mod exclusions;
mod flags;
mod source;
mod store;

pub use exclusions::{FocusExclusions, FocusExclusionsBuilder};
pub use flags::{
    FocusCommands, HostCommand, LOST_DOC_FOCUS_CMD_ARGS_KEY, LOST_DOC_FOCUS_CMD_KEY,
    LOST_FOCUS_CMD_ARGS_KEY, LOST_FOCUS_CMD_KEY, PolicyFlags, SAVE_FILES_KEY, SAVE_PROJECTS_KEY,
    SAVE_SINGLE_DOCUMENT_KEY, SAVE_SOLUTIONS_KEY, format_bool, parse_bool,
};
pub use source::{PolicySource, SharedPolicy};
pub use store::{DEFAULT_GROUP, PolicyStore};
