//! In-memory collaborators for tests and the developer harness.
//!
//! [`MockHost`] models a host with documents, projects and a workspace. It
//! records every call and applies saves to its own state, so callers can
//! assert both on what was requested and on the resulting dirty flags.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::host::{EntityId, EntityRef, Host, HostError, SaveStatus, WorkspaceState};
use crate::policy::HostCommand;
use crate::status::{SinkError, StatusSink};

/// A call received by [`MockHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// `activate(id)`
    Activate(String),
    /// `save(entity)`
    Save(String),
    /// `save_workspace_as(path)`
    SaveWorkspaceAs(PathBuf),
    /// `save_all()`
    SaveAll,
    /// `run_command(name, args)`
    RunCommand(String, String),
}

#[derive(Debug, Default)]
struct HostState {
    documents: Vec<EntityRef>,
    projects: Vec<EntityRef>,
    workspace: Option<WorkspaceState>,
    active: Option<EntityId>,
    calls: Vec<HostCall>,
    save_failures: HashMap<String, HostError>,
    activate_failures: HashMap<String, HostError>,
    cancelled: Vec<String>,
    save_all_failure: Option<HostError>,
    command_failure: Option<HostError>,
}

/// Scriptable in-memory [`Host`].
#[derive(Debug, Default)]
pub struct MockHost {
    state: Mutex<HostState>,
}

impl MockHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an open document.
    pub fn with_document(self, document: EntityRef) -> Self {
        self.with_state(|s| s.documents.push(document));
        self
    }

    /// Add an open project.
    pub fn with_project(self, project: EntityRef) -> Self {
        self.with_state(|s| s.projects.push(project));
        self
    }

    /// Open a workspace.
    pub fn with_workspace(self, workspace: WorkspaceState) -> Self {
        self.with_state(|s| s.workspace = Some(workspace));
        self
    }

    /// Set the active document.
    pub fn with_active(self, id: &str) -> Self {
        self.with_state(|s| s.active = Some(EntityId::new(id)));
        self
    }

    /// Make `save` of entity `id` fail.
    pub fn fail_save(&self, id: &str, error: HostError) {
        self.with_state(|s| {
            s.save_failures.insert(id.to_string(), error);
        });
    }

    /// Make `save` of entity `id` report [`SaveStatus::Cancelled`].
    pub fn cancel_save(&self, id: &str) {
        self.with_state(|s| s.cancelled.push(id.to_string()));
    }

    /// Make `activate` of `id` fail.
    pub fn fail_activate(&self, id: &str, error: HostError) {
        self.with_state(|s| {
            s.activate_failures.insert(id.to_string(), error);
        });
    }

    /// Make `save_all` fail.
    pub fn fail_save_all(&self, error: HostError) {
        self.with_state(|s| s.save_all_failure = Some(error));
    }

    /// Make `run_command` fail.
    pub fn fail_commands(&self, error: HostError) {
        self.with_state(|s| s.command_failure = Some(error));
    }

    /// Mark a document, project or (with id `"workspace"`) the workspace
    /// dirty or clean.
    pub fn set_dirty(&self, id: &str, dirty: bool) -> bool {
        self.with_state(|s| {
            if id == "workspace"
                && let Some(ws) = s.workspace.as_mut()
            {
                ws.dirty = dirty;
                return true;
            }
            match s
                .documents
                .iter_mut()
                .chain(s.projects.iter_mut())
                .find(|e| e.id.0 == id)
            {
                Some(entity) => {
                    entity.dirty = dirty;
                    true
                }
                None => false,
            }
        })
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<HostCall> {
        self.with_state(|s| s.calls.clone())
    }

    /// Ids passed to `save`, in order.
    pub fn saved(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::Save(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// The active document id.
    pub fn active(&self) -> Option<String> {
        self.with_state(|s| s.active.as_ref().map(|id| id.0.clone()))
    }

    /// Whether entity `id` is dirty; `None` if unknown.
    pub fn is_dirty(&self, id: &str) -> Option<bool> {
        self.with_state(|s| {
            if id == "workspace" {
                return s.workspace.as_ref().map(|w| w.dirty);
            }
            s.documents
                .iter()
                .chain(s.projects.iter())
                .find(|e| e.id.0 == id)
                .map(|e| e.dirty)
        })
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut HostState) -> T) -> T {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl Host for MockHost {
    fn documents(&self) -> Vec<EntityRef> {
        self.with_state(|s| s.documents.clone())
    }

    fn projects(&self) -> Vec<EntityRef> {
        self.with_state(|s| s.projects.clone())
    }

    fn workspace(&self) -> Option<WorkspaceState> {
        self.with_state(|s| s.workspace.clone())
    }

    fn active_document(&self) -> Option<EntityId> {
        self.with_state(|s| s.active.clone())
    }

    fn activate(&self, id: &EntityId) -> Result<(), HostError> {
        self.with_state(|s| {
            s.calls.push(HostCall::Activate(id.0.clone()));
            if let Some(err) = s.activate_failures.get(&id.0) {
                return Err(err.clone());
            }
            if !s.documents.iter().any(|d| &d.id == id) {
                return Err(HostError::NotFound(id.0.clone()));
            }
            s.active = Some(id.clone());
            Ok(())
        })
    }

    fn save(&self, entity: &EntityRef) -> Result<SaveStatus, HostError> {
        self.with_state(|s| {
            s.calls.push(HostCall::Save(entity.id.0.clone()));
            if let Some(err) = s.save_failures.get(&entity.id.0) {
                return Err(err.clone());
            }
            if s.cancelled.contains(&entity.id.0) {
                return Ok(SaveStatus::Cancelled);
            }
            let target = s
                .documents
                .iter_mut()
                .chain(s.projects.iter_mut())
                .find(|e| e.id == entity.id)
                .ok_or_else(|| HostError::NotFound(entity.id.0.clone()))?;
            target.dirty = false;
            Ok(SaveStatus::Succeeded)
        })
    }

    fn save_workspace_as(&self, path: &Path) -> Result<SaveStatus, HostError> {
        self.with_state(|s| {
            s.calls.push(HostCall::SaveWorkspaceAs(path.to_path_buf()));
            if let Some(err) = s.save_failures.get("workspace") {
                return Err(err.clone());
            }
            let ws = s
                .workspace
                .as_mut()
                .ok_or_else(|| HostError::NotFound("workspace".to_string()))?;
            ws.dirty = false;
            Ok(SaveStatus::Succeeded)
        })
    }

    fn save_all(&self) -> Result<(), HostError> {
        self.with_state(|s| {
            s.calls.push(HostCall::SaveAll);
            if let Some(err) = &s.save_all_failure {
                return Err(err.clone());
            }
            for entity in s.documents.iter_mut().chain(s.projects.iter_mut()) {
                entity.dirty = false;
            }
            if let Some(ws) = s.workspace.as_mut() {
                ws.dirty = false;
            }
            Ok(())
        })
    }

    fn run_command(&self, command: &HostCommand) -> Result<(), HostError> {
        self.with_state(|s| {
            s.calls.push(HostCall::RunCommand(
                command.name.clone(),
                command.args.clone(),
            ));
            match &s.command_failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        })
    }
}

/// [`StatusSink`] that keeps every line in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns true if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl StatusSink for RecordingSink {
    fn output(&self, line: &str) -> Result<(), SinkError> {
        self.lines
            .lock()
            .map_err(|_| SinkError::Unavailable("recording sink poisoned".to_string()))?
            .push(line.to_string());
        Ok(())
    }
}
