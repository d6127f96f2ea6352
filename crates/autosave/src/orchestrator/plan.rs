//! Save planning.
//!
//! Planning is a pure function of the policy, the event and a snapshot of
//! host state. It makes no host calls; [`super::execute`] carries a plan out.

use crate::host::{EntityId, EntityRef, WindowRef, WorkspaceState};
use crate::policy::{FocusExclusions, HostCommand, PolicyFlags};

/// A single host request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAction {
    /// Coarse "save everything" command.
    SaveAll,
    /// Bring a document forward before saving it.
    Activate {
        /// Document to activate
        id: EntityId,
    },
    /// Save one document.
    SaveDocument {
        /// Document to save
        document: EntityRef,
    },
    /// Save one project.
    SaveProject {
        /// Project to save
        project: EntityRef,
    },
    /// Re-save the workspace to its own path.
    SaveWorkspace {
        /// Workspace to save
        workspace: WorkspaceState,
    },
    /// Reactivate the document that was active before the pass.
    RestoreFocus {
        /// Previously active document
        id: EntityId,
    },
    /// Run a custom host command.
    RunCommand {
        /// Command to run
        command: HostCommand,
    },
}

/// One step of a plan: a status notice or a host request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Status line emitted when the step is reached
    Notice(String),
    /// Host request
    Action(SaveAction),
}

/// Ordered steps produced for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavePlan {
    steps: Vec<PlanStep>,
}

impl SavePlan {
    /// An empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Host requests in execution order, without notices.
    pub fn actions(&self) -> impl Iterator<Item = &SaveAction> {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Action(a) => Some(a),
            PlanStep::Notice(_) => None,
        })
    }

    /// Notices in order.
    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Notice(n) => Some(n.as_str()),
            PlanStep::Action(_) => None,
        })
    }

    /// Returns true if the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn notice(&mut self, text: impl Into<String>) {
        self.steps.push(PlanStep::Notice(text.into()));
    }

    fn action(&mut self, action: SaveAction) {
        self.steps.push(PlanStep::Action(action));
    }

    fn extend(&mut self, other: SavePlan) {
        self.steps.extend(other.steps);
    }
}

/// Host state read at the start of an app-level pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSnapshot {
    /// Open documents
    pub documents: Vec<EntityRef>,
    /// Open projects
    pub projects: Vec<EntityRef>,
    /// Workspace, if open
    pub workspace: Option<WorkspaceState>,
    /// Active document before the pass
    pub active_document: Option<EntityId>,
}

/// Plan the pass for the application losing focus.
///
/// With every app-level flag on this is a single coarse save. Otherwise
/// documents, projects and the workspace are handled one kind at a time in
/// that order, each according to its own flag. The lost-focus command, when
/// configured, runs last and only while a document is active.
pub fn plan_app_focus_lost(flags: &PolicyFlags, snapshot: &HostSnapshot) -> SavePlan {
    let mut plan = SavePlan::new();

    if flags.saves_everything() {
        plan.action(SaveAction::SaveAll);
    } else {
        plan.extend(plan_documents(flags, snapshot));
        plan.extend(plan_projects(flags, snapshot));
        plan.extend(plan_workspace(flags, snapshot));
    }

    if let Some(command) = flags.lost_focus_command()
        && snapshot.active_document.is_some()
    {
        plan.action(SaveAction::RunCommand {
            command: command.clone(),
        });
    }
    plan
}

fn plan_documents(flags: &PolicyFlags, snapshot: &HostSnapshot) -> SavePlan {
    let mut plan = SavePlan::new();
    let dirty: Vec<&EntityRef> = snapshot.documents.iter().filter(|d| d.dirty).collect();

    if dirty.is_empty() {
        plan.notice("No modified documents to save");
        return plan;
    }
    if !flags.save_documents {
        plan.notice("There are modified documents, but document autosave is off");
        return plan;
    }

    plan.notice("Saving modified documents...");
    for document in dirty {
        plan.action(SaveAction::Activate {
            id: document.id.clone(),
        });
        plan.action(SaveAction::SaveDocument {
            document: document.clone(),
        });
    }
    if let Some(active) = &snapshot.active_document {
        plan.action(SaveAction::RestoreFocus { id: active.clone() });
    }
    plan
}

fn plan_projects(flags: &PolicyFlags, snapshot: &HostSnapshot) -> SavePlan {
    let mut plan = SavePlan::new();
    let dirty: Vec<&EntityRef> = snapshot.projects.iter().filter(|p| p.dirty).collect();

    if dirty.is_empty() {
        plan.notice("No modified projects to save");
    } else if !flags.save_projects {
        plan.notice("There are modified projects, but project autosave is off");
    } else {
        for project in dirty {
            plan.action(SaveAction::SaveProject {
                project: project.clone(),
            });
        }
    }
    plan
}

fn plan_workspace(flags: &PolicyFlags, snapshot: &HostSnapshot) -> SavePlan {
    let mut plan = SavePlan::new();
    match &snapshot.workspace {
        Some(workspace) if workspace.dirty => {
            if flags.save_solution {
                plan.action(SaveAction::SaveWorkspace {
                    workspace: workspace.clone(),
                });
            } else {
                plan.notice("The solution is modified, but solution autosave is off");
            }
        }
        _ => {}
    }
    plan
}

/// Plan for a document window losing focus while the app stays active.
///
/// Independent of the app-level flags: only `save_single_document` decides.
pub fn plan_window_focus_lost(flags: &PolicyFlags, window: &WindowRef) -> SavePlan {
    let mut plan = SavePlan::new();
    let Some(document) = window.document.as_ref().filter(|_| window.is_document()) else {
        return plan;
    };
    if !document.dirty {
        return plan;
    }

    if flags.save_single_document {
        plan.action(SaveAction::SaveDocument {
            document: document.clone(),
        });
    } else {
        plan.notice(format!(
            "{} is modified, but single-document autosave is off",
            document.name
        ));
    }
    plan
}

/// Plan for a document window gaining focus.
///
/// Runs the document-focus command unless the window is excluded.
pub fn plan_window_focus_gained(
    flags: &PolicyFlags,
    window: &WindowRef,
    exclusions: &FocusExclusions,
) -> SavePlan {
    let mut plan = SavePlan::new();
    if !window.is_document() || exclusions.excludes(window) {
        return plan;
    }
    if let Some(command) = flags.doc_focus_command() {
        plan.action(SaveAction::RunCommand {
            command: command.clone(),
        });
    }
    plan
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::host::EntityKind;
    use crate::policy::FocusCommands;

    fn doc(id: &str, dirty: bool) -> EntityRef {
        EntityRef::new(id, EntityKind::Document, format!("{id}.rs")).with_dirty(dirty)
    }

    fn project(id: &str, dirty: bool) -> EntityRef {
        EntityRef::new(id, EntityKind::Project, id).with_dirty(dirty)
    }

    fn flags(docs: bool, projects: bool, solution: bool) -> PolicyFlags {
        PolicyFlags {
            save_documents: docs,
            save_projects: projects,
            save_solution: solution,
            ..PolicyFlags::default()
        }
    }

    fn busy_snapshot() -> HostSnapshot {
        HostSnapshot {
            documents: vec![doc("a", true), doc("b", false), doc("c", true)],
            projects: vec![project("p1", true), project("p2", false)],
            workspace: Some(WorkspaceState {
                name: "/src/app.sln".to_string(),
                path: PathBuf::from("/src/app.sln"),
                dirty: true,
            }),
            active_document: Some(EntityId::new("b")),
        }
    }

    #[test]
    fn test_all_flags_use_coarse_save() {
        let plan = plan_app_focus_lost(&flags(true, true, true), &busy_snapshot());
        let actions: Vec<_> = plan.actions().collect();
        assert_eq!(actions, vec![&SaveAction::SaveAll]);
    }

    #[test]
    fn test_itemized_order() {
        let plan = plan_app_focus_lost(&flags(true, true, false), &busy_snapshot());
        let actions: Vec<_> = plan.actions().cloned().collect();
        assert_eq!(
            actions,
            vec![
                SaveAction::Activate { id: "a".into() },
                SaveAction::SaveDocument { document: doc("a", true) },
                SaveAction::Activate { id: "c".into() },
                SaveAction::SaveDocument { document: doc("c", true) },
                SaveAction::RestoreFocus { id: "b".into() },
                SaveAction::SaveProject { project: project("p1", true) },
            ]
        );
        assert!(
            plan.notices()
                .any(|n| n.contains("solution autosave is off"))
        );
    }

    #[test]
    fn test_one_flag_off_saves_only_enabled_kinds() {
        let cases = [
            (true, true, false, vec!["a", "c", "p1"]),
            (true, false, true, vec!["a", "c", "/src/app.sln"]),
            (false, true, true, vec!["p1", "/src/app.sln"]),
        ];
        for (docs, projects, solution, expected) in cases {
            let plan = plan_app_focus_lost(&flags(docs, projects, solution), &busy_snapshot());
            assert!(!plan.actions().any(|a| *a == SaveAction::SaveAll));

            let saved: Vec<&str> = plan
                .actions()
                .filter_map(|a| match a {
                    SaveAction::SaveDocument { document } => Some(document.id.0.as_str()),
                    SaveAction::SaveProject { project } => Some(project.id.0.as_str()),
                    SaveAction::SaveWorkspace { workspace } => Some(workspace.name.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(saved, expected, "flags ({docs}, {projects}, {solution})");
        }
    }

    #[test]
    fn test_disabled_kinds_only_notice() {
        let plan = plan_app_focus_lost(&flags(false, false, true), &busy_snapshot());
        let actions: Vec<_> = plan.actions().collect();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], SaveAction::SaveWorkspace { .. }));

        let notices: Vec<_> = plan.notices().collect();
        assert!(notices.iter().any(|n| n.contains("document autosave is off")));
        assert!(notices.iter().any(|n| n.contains("project autosave is off")));
    }

    #[test]
    fn test_nothing_dirty() {
        let snapshot = HostSnapshot {
            documents: vec![doc("a", false)],
            projects: vec![project("p", false)],
            workspace: None,
            active_document: Some("a".into()),
        };
        let plan = plan_app_focus_lost(&flags(true, false, false), &snapshot);
        assert_eq!(plan.actions().count(), 0);
        let notices: Vec<_> = plan.notices().collect();
        assert_eq!(
            notices,
            vec!["No modified documents to save", "No modified projects to save"]
        );
    }

    #[test]
    fn test_no_restore_without_active_document() {
        let snapshot = HostSnapshot {
            documents: vec![doc("a", true)],
            ..HostSnapshot::default()
        };
        let plan = plan_app_focus_lost(&flags(true, false, false), &snapshot);
        assert!(
            !plan
                .actions()
                .any(|a| matches!(a, SaveAction::RestoreFocus { .. }))
        );
    }

    #[test]
    fn test_lost_focus_command_runs_last() {
        let mut f = flags(true, false, false);
        f.commands = Some(FocusCommands {
            lost_focus: Some(HostCommand::new("Edit.SelectionCancel", "")),
            doc_focus: None,
        });
        let plan = plan_app_focus_lost(&f, &busy_snapshot());
        assert!(matches!(
            plan.actions().last(),
            Some(SaveAction::RunCommand { .. })
        ));

        // Needs an active document
        let idle = HostSnapshot::default();
        assert_eq!(plan_app_focus_lost(&f, &idle).actions().count(), 0);

        // Also follows the coarse save
        f.save_projects = true;
        f.save_solution = true;
        let actions: Vec<_> = plan_app_focus_lost(&f, &busy_snapshot())
            .actions()
            .cloned()
            .collect();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], SaveAction::SaveAll);
    }

    #[test]
    fn test_single_document_ignores_app_flags() {
        let window = WindowRef::document("a.rs", doc("a", true));
        for all in [true, false] {
            let mut f = flags(all, all, all);
            f.save_single_document = true;
            let plan = plan_window_focus_lost(&f, &window);
            assert_eq!(
                plan.actions().cloned().collect::<Vec<_>>(),
                vec![SaveAction::SaveDocument { document: doc("a", true) }]
            );

            f.save_single_document = false;
            let plan = plan_window_focus_lost(&f, &window);
            assert_eq!(plan.actions().count(), 0);
            assert_eq!(plan.notices().count(), 1);
        }
    }

    #[test]
    fn test_single_document_clean_or_tool_window() {
        let f = PolicyFlags {
            save_single_document: true,
            ..PolicyFlags::default()
        };
        assert!(plan_window_focus_lost(&f, &WindowRef::document("a", doc("a", false))).is_empty());
        assert!(plan_window_focus_lost(&f, &WindowRef::tool("Output")).is_empty());
    }

    #[test]
    fn test_gained_focus_command() {
        let mut f = PolicyFlags::default();
        let window = WindowRef::document("a.rs", doc("a", false));
        let rules = FocusExclusions::default();

        // Capability absent
        assert!(plan_window_focus_gained(&f, &window, &rules).is_empty());

        f.commands = Some(FocusCommands {
            lost_focus: None,
            doc_focus: Some(HostCommand::new("VsVim.Normal", "")),
        });
        assert_eq!(plan_window_focus_gained(&f, &window, &rules).actions().count(), 1);

        let designer = WindowRef::document("Form1.cs [Design]", doc("f", false));
        assert!(plan_window_focus_gained(&f, &designer, &rules).is_empty());
        assert!(plan_window_focus_gained(&f, &WindowRef::tool("Output"), &rules).is_empty());
    }
}
