//! Host environment contract.
//!
//! The orchestrator never owns documents, projects or the workspace. It
//! reads snapshots of their state from the [`Host`] and issues requests
//! back by id.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::policy::HostCommand;

/// Errors reported by host operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    /// A host service is not available (e.g. during shutdown)
    #[error("host service unavailable: {0}")]
    Unavailable(String),
    /// The referenced entity no longer exists
    #[error("no such entity: {0}")]
    NotFound(String),
    /// The operation ran and failed
    #[error("{0}")]
    Failed(String),
}

/// Outcome of a host save call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveStatus {
    /// The entity was written
    Succeeded,
    /// The save was cancelled (e.g. by a prompt the user dismissed)
    Cancelled,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Succeeded => f.write_str("saved"),
            SaveStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Host-assigned entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Create an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of saveable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    /// An open document
    Document,
    /// A project in the workspace
    Project,
}

/// Snapshot of a document or project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    /// Host id
    pub id: EntityId,
    /// Kind of entity
    pub kind: EntityKind,
    /// Display name
    pub name: String,
    /// Has unsaved modifications
    #[serde(default)]
    pub dirty: bool,
    /// Document language, when the host reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl EntityRef {
    /// Create a clean entity.
    pub fn new(id: impl Into<EntityId>, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            dirty: false,
            language: None,
        }
    }

    /// Mark the entity dirty or clean.
    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }
}

/// Snapshot of the workspace (solution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceState {
    /// Display name (usually the full path)
    pub name: String,
    /// Current file path; saving targets this same path
    pub path: PathBuf,
    /// Has unsaved modifications
    #[serde(default)]
    pub dirty: bool,
}

/// A window involved in a focus change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRef {
    /// Window caption
    pub caption: String,
    /// The document shown, for document windows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<EntityRef>,
}

impl WindowRef {
    /// A document window.
    pub fn document(caption: impl Into<String>, document: EntityRef) -> Self {
        Self {
            caption: caption.into(),
            document: Some(document),
        }
    }

    /// A tool window (no document).
    pub fn tool(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            document: None,
        }
    }

    /// Returns true if the window hosts a document.
    pub fn is_document(&self) -> bool {
        self.document
            .as_ref()
            .is_some_and(|d| d.kind == EntityKind::Document)
    }
}

/// Operations the orchestrator needs from the host.
///
/// All calls are synchronous from the orchestrator's point of view and are
/// made from the host's single dispatch thread.
pub trait Host {
    /// Snapshot of every open document.
    fn documents(&self) -> Vec<EntityRef>;

    /// Snapshot of every open project.
    fn projects(&self) -> Vec<EntityRef>;

    /// The workspace, if one is open.
    fn workspace(&self) -> Option<WorkspaceState>;

    /// The currently active document.
    fn active_document(&self) -> Option<EntityId>;

    /// Bring a document to the foreground.
    fn activate(&self, id: &EntityId) -> Result<(), HostError>;

    /// Save a document or project.
    fn save(&self, entity: &EntityRef) -> Result<SaveStatus, HostError>;

    /// Save the workspace to `path`.
    fn save_workspace_as(&self, path: &Path) -> Result<SaveStatus, HostError>;

    /// Save everything in one coarse host command.
    fn save_all(&self) -> Result<(), HostError>;

    /// Run a named host command.
    fn run_command(&self, command: &HostCommand) -> Result<(), HostError>;
}

impl<H: Host + ?Sized> Host for &H {
    fn documents(&self) -> Vec<EntityRef> {
        (**self).documents()
    }

    fn projects(&self) -> Vec<EntityRef> {
        (**self).projects()
    }

    fn workspace(&self) -> Option<WorkspaceState> {
        (**self).workspace()
    }

    fn active_document(&self) -> Option<EntityId> {
        (**self).active_document()
    }

    fn activate(&self, id: &EntityId) -> Result<(), HostError> {
        (**self).activate(id)
    }

    fn save(&self, entity: &EntityRef) -> Result<SaveStatus, HostError> {
        (**self).save(entity)
    }

    fn save_workspace_as(&self, path: &Path) -> Result<SaveStatus, HostError> {
        (**self).save_workspace_as(path)
    }

    fn save_all(&self) -> Result<(), HostError> {
        (**self).save_all()
    }

    fn run_command(&self, command: &HostCommand) -> Result<(), HostError> {
        (**self).run_command(command)
    }
}

/// A focus notification from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FocusEvent {
    /// The application was activated (`true`) or deactivated (`false`).
    Application {
        /// New activation state
        active: bool,
    },
    /// Focus moved between windows inside the application.
    Window {
        /// Window that received focus
        #[serde(default)]
        gained: Option<WindowRef>,
        /// Window that lost focus
        #[serde(default)]
        lost: Option<WindowRef>,
    },
}
