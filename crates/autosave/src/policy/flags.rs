//! Policy flag snapshot and its settings-store encoding.

use serde::{Deserialize, Serialize};

/// Settings key for [`PolicyFlags::save_documents`].
pub const SAVE_FILES_KEY: &str = "SaveFiles";
/// Settings key for [`PolicyFlags::save_projects`].
pub const SAVE_PROJECTS_KEY: &str = "SaveProjects";
/// Settings key for [`PolicyFlags::save_solution`].
pub const SAVE_SOLUTIONS_KEY: &str = "SaveSolutions";
/// Settings key for [`PolicyFlags::save_single_document`].
pub const SAVE_SINGLE_DOCUMENT_KEY: &str = "SaveSingleDocument";
/// Settings key for the lost-focus command name.
pub const LOST_FOCUS_CMD_KEY: &str = "LostFocusCmd";
/// Settings key for the lost-focus command arguments.
pub const LOST_FOCUS_CMD_ARGS_KEY: &str = "LostFocusCmdArgs";
/// Settings key for the document-focus command name.
pub const LOST_DOC_FOCUS_CMD_KEY: &str = "LostDocFocusCmd";
/// Settings key for the document-focus command arguments.
pub const LOST_DOC_FOCUS_CMD_ARGS_KEY: &str = "LostDocFocusCmdArgs";

/// A host command invocation configured by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCommand {
    /// Host command name (e.g. `Edit.SelectionCancel`)
    pub name: String,
    /// Free-form argument string passed through to the host
    #[serde(default)]
    pub args: String,
}

impl HostCommand {
    /// Create a new command.
    pub fn new(name: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: args.into(),
        }
    }

    /// Build a command from raw stored strings.
    ///
    /// A blank name means the command is not configured.
    pub fn from_stored(name: Option<&str>, args: Option<&str>) -> Option<Self> {
        let name = name.map(str::trim).filter(|n| !n.is_empty())?;
        let args = args.filter(|a| !a.trim().is_empty()).unwrap_or_default();
        Some(Self::new(name, args))
    }
}

/// Custom commands run around focus changes.
///
/// Present on [`PolicyFlags`] only when the command capability is enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusCommands {
    /// Run after the app-level save pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lost_focus: Option<HostCommand>,
    /// Run when a document window gains focus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_focus: Option<HostCommand>,
}

/// Snapshot of the autosave policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyFlags {
    /// Save all modified documents when the application loses focus
    pub save_documents: bool,
    /// Save a document when its own window loses focus
    pub save_single_document: bool,
    /// Save modified projects when the application loses focus
    pub save_projects: bool,
    /// Save the modified solution when the application loses focus
    pub save_solution: bool,
    /// Custom focus commands; `None` when the capability is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<FocusCommands>,
}

impl Default for PolicyFlags {
    fn default() -> Self {
        Self {
            save_documents: true,
            save_single_document: false,
            save_projects: false,
            save_solution: false,
            commands: None,
        }
    }
}

impl PolicyFlags {
    /// Returns true when every app-level flag is on and a single coarse
    /// save can replace the itemized pass.
    pub fn saves_everything(&self) -> bool {
        self.save_documents && self.save_projects && self.save_solution
    }

    /// The configured lost-focus command, if any.
    pub fn lost_focus_command(&self) -> Option<&HostCommand> {
        self.commands.as_ref()?.lost_focus.as_ref()
    }

    /// The configured document-focus command, if any.
    pub fn doc_focus_command(&self) -> Option<&HostCommand> {
        self.commands.as_ref()?.doc_focus.as_ref()
    }

    /// Boolean flags paired with their settings key.
    pub(crate) fn flag_entries(&self) -> [(&'static str, bool); 4] {
        [
            (SAVE_FILES_KEY, self.save_documents),
            (SAVE_PROJECTS_KEY, self.save_projects),
            (SAVE_SOLUTIONS_KEY, self.save_solution),
            (SAVE_SINGLE_DOCUMENT_KEY, self.save_single_document),
        ]
    }
}

/// Parse a stored boolean.
///
/// Accepts `true`/`false` in any case with surrounding whitespace.
pub fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Format a boolean the way existing settings groups store it.
pub fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}
