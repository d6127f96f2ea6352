//! Carrying out a [`SavePlan`] against the host.

use crate::host::{Host, HostError, SaveStatus};
use crate::status::StatusLog;

use super::plan::{PlanStep, SaveAction, SavePlan};

/// What happened to one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// A save call returned a status
    Saved(SaveStatus),
    /// A non-save call completed
    Done,
    /// The call failed; the pass continued unless the action was `SaveAll`
    Failed(HostError),
}

/// An executed action and its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    /// The request
    pub action: SaveAction,
    /// Its result
    pub result: ActionResult,
}

/// Results of executing one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Outcomes in execution order
    pub outcomes: Vec<ActionOutcome>,
    /// True if a failed coarse save ended the pass early
    pub aborted: bool,
}

impl PassReport {
    /// Outcomes whose call failed.
    pub fn failures(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, ActionResult::Failed(_)))
    }

    /// Returns true if nothing failed.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Execute `plan` against `host`.
///
/// Every failure is caught where it happens and reported with the entity
/// name and the host's message; the remaining steps still run. The one
/// exception is a failed coarse save, which ends the pass so that the
/// itemized strategy never overlaps with a partially applied "save all".
pub fn execute<H: Host + ?Sized>(host: &H, plan: &SavePlan, status: &StatusLog) -> PassReport {
    let mut report = PassReport::default();

    for step in plan.steps() {
        let action = match step {
            PlanStep::Notice(text) => {
                status.line(text);
                continue;
            }
            PlanStep::Action(action) => action,
        };

        let result = run_action(host, action, status);
        let stop = matches!(
            (action, &result),
            (SaveAction::SaveAll, ActionResult::Failed(_))
        );
        report.outcomes.push(ActionOutcome {
            action: action.clone(),
            result,
        });
        if stop {
            report.aborted = true;
            break;
        }
    }
    report
}

fn run_action<H: Host + ?Sized>(host: &H, action: &SaveAction, status: &StatusLog) -> ActionResult {
    match action {
        SaveAction::SaveAll => match host.save_all() {
            Ok(()) => {
                status.line("Saved all modified items");
                ActionResult::Done
            }
            Err(e) => {
                status.line(format!("Save all failed: {e}"));
                ActionResult::Failed(e)
            }
        },
        SaveAction::Activate { id } => match host.activate(id) {
            Ok(()) => ActionResult::Done,
            Err(e) => {
                status.debug(format!("could not activate {id}: {e}"));
                ActionResult::Failed(e)
            }
        },
        SaveAction::SaveDocument { document } => {
            save_result(status, "    - ", &document.name, host.save(document))
        }
        SaveAction::SaveProject { project } => save_result(
            status,
            "    Saving project ",
            &project.name,
            host.save(project),
        ),
        SaveAction::SaveWorkspace { workspace } => save_result(
            status,
            "    Saving solution ",
            &workspace.name,
            host.save_workspace_as(&workspace.path),
        ),
        SaveAction::RestoreFocus { id } => match host.activate(id) {
            Ok(()) => ActionResult::Done,
            Err(e) => {
                status.line(format!("Could not reactivate {id}: {e}"));
                ActionResult::Failed(e)
            }
        },
        SaveAction::RunCommand { command } => match host.run_command(command) {
            Ok(()) => {
                tracing::debug!(command = %command.name, args = %command.args, "ran focus command");
                ActionResult::Done
            }
            Err(e) => {
                status.line(format!(
                    "Command {} {} failed: {e}",
                    command.name, command.args
                ));
                ActionResult::Failed(e)
            }
        },
    }
}

fn save_result(
    status: &StatusLog,
    prefix: &str,
    name: &str,
    result: Result<SaveStatus, HostError>,
) -> ActionResult {
    match result {
        Ok(saved) => {
            status.line(format!("{prefix}{name}... {saved}"));
            ActionResult::Saved(saved)
        }
        Err(e) => {
            tracing::warn!(entity = %name, error = %e, "save failed");
            status.line(format!("{prefix}{name}... failed: {e}"));
            ActionResult::Failed(e)
        }
    }
}
