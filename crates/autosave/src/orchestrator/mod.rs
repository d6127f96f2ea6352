//! Focus-driven save orchestration.
//!
//! The [`SaveOrchestrator`] reacts to host focus notifications:
//!
//! - **Application deactivated**: documents, projects and the workspace are
//!   saved according to the policy, or everything at once with a single
//!   coarse save when all three app-level flags are on.
//! - **Document window lost focus**: that document alone is saved when
//!   single-document autosave is on.
//! - **Document window gained focus**: the optional document-focus command
//!   runs, unless the window is excluded.
//!
//! Each notification is handled to completion before returning. Decisions
//! are made by the pure planners in [`plan`]; [`execute`] applies a plan to
//! the host.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use autosave::{FocusEvent, SaveOrchestrator, SharedPolicy};
//! use autosave::settings::JsonFileSettingsStore;
//!
//! let ui = SharedPolicy::new();
//! let mut orchestrator = SaveOrchestrator::builder(host, Arc::new(JsonFileSettingsStore::open(path)))
//!     .policy_source(Arc::new(ui.clone()))
//!     .build();
//! orchestrator.start();
//!
//! orchestrator.handle(&FocusEvent::Application { active: false });
//! ```

mod execute;
pub mod plan;

use std::sync::Arc;

pub use execute::{ActionOutcome, ActionResult, PassReport, execute};
pub use plan::{HostSnapshot, PlanStep, SaveAction, SavePlan};

use crate::host::{FocusEvent, Host, WindowRef};
use crate::policy::{FocusExclusions, PolicyFlags, PolicySource, PolicyStore, SharedPolicy};
use crate::settings::SettingsStore;
use crate::status::{StatusLog, StatusSink};

/// Reacts to focus changes by saving what the policy asks for.
pub struct SaveOrchestrator<H: Host> {
    host: H,
    store: PolicyStore<dyn SettingsStore>,
    source: Arc<dyn PolicySource>,
    exclusions: FocusExclusions,
    status: StatusLog,
    app_active: bool,
}

impl<H: Host> std::fmt::Debug for SaveOrchestrator<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveOrchestrator")
            .field("store", &self.store)
            .field("exclusions", &self.exclusions)
            .field("app_active", &self.app_active)
            .finish_non_exhaustive()
    }
}

impl<H: Host> SaveOrchestrator<H> {
    /// Start building an orchestrator for `host` persisting to `settings`.
    pub fn builder(host: H, settings: Arc<dyn SettingsStore>) -> SaveOrchestratorBuilder<H> {
        SaveOrchestratorBuilder::new(host, settings)
    }

    /// Load the stored policy and publish it to the live settings state.
    pub fn start(&mut self) -> PolicyFlags {
        let flags = self.store.load();
        self.source.publish(flags.clone());
        tracing::info!(
            save_documents = flags.save_documents,
            save_projects = flags.save_projects,
            save_solution = flags.save_solution,
            save_single_document = flags.save_single_document,
            "focus autosave initialized"
        );
        self.status.line("Focus autosave initialized");
        flags
    }

    /// The policy in effect right now.
    ///
    /// Reads the live settings state, falling back to the store when the
    /// UI state is unavailable.
    pub fn current_policy(&self) -> PolicyFlags {
        let mut flags = self.source.snapshot().unwrap_or_else(|| {
            tracing::debug!("live policy unavailable, reading settings store");
            self.store.load()
        });
        if !self.store.commands_enabled() {
            flags.commands = None;
        }
        flags
    }

    /// Handle one focus notification.
    pub fn handle(&mut self, event: &FocusEvent) -> PassReport {
        match event {
            FocusEvent::Application { active } => self.on_app_focus_changed(*active),
            FocusEvent::Window { gained, lost } => {
                self.on_window_focus_changed(gained.as_ref(), lost.as_ref())
            }
        }
    }

    /// Handle the application being activated or deactivated.
    ///
    /// Only deactivation triggers a pass, and only once until the
    /// application is seen active again (activation or a window focus
    /// change).
    pub fn on_app_focus_changed(&mut self, active: bool) -> PassReport {
        if active {
            self.app_active = true;
            return PassReport::default();
        }
        if !self.app_active {
            self.status.debug("application already inactive, skipping pass");
            return PassReport::default();
        }
        self.app_active = false;

        let flags = self.current_policy();
        let snapshot = self.snapshot();
        let plan = plan::plan_app_focus_lost(&flags, &snapshot);
        tracing::debug!(
            coarse = flags.saves_everything(),
            documents = snapshot.documents.len(),
            projects = snapshot.projects.len(),
            "application lost focus"
        );
        execute(&self.host, &plan, &self.status)
    }

    /// Handle focus moving between windows.
    ///
    /// The window that lost focus is handled before the one that gained it.
    /// Focus moving inside the application also re-arms the deactivation
    /// trigger, for hosts that do not report activation.
    pub fn on_window_focus_changed(
        &mut self,
        gained: Option<&WindowRef>,
        lost: Option<&WindowRef>,
    ) -> PassReport {
        self.app_active = true;
        self.status.debug(format!(
            "GotFocus: {}  LostFocus: {}",
            gained.map_or("no GotFocus window", |w| w.caption.as_str()),
            lost.map_or("no LostFocus window", |w| w.caption.as_str()),
        ));

        let flags = self.current_policy();
        let plan = lost
            .map(|window| plan::plan_window_focus_lost(&flags, window))
            .unwrap_or_default();
        let mut report = execute(&self.host, &plan, &self.status);

        if let Some(window) = gained {
            let plan = plan::plan_window_focus_gained(&flags, window, &self.exclusions);
            report
                .outcomes
                .extend(execute(&self.host, &plan, &self.status).outcomes);
        }
        report
    }

    /// The host is about to close: flush the live settings to the store.
    ///
    /// Always allows the close to proceed.
    pub fn on_query_close(&mut self) -> bool {
        match self.source.snapshot() {
            Some(flags) => {
                let failed = self.store.save(&flags);
                if failed > 0 {
                    tracing::warn!(failed, "some settings were not saved at close");
                }
            }
            None => self
                .status
                .debug("live policy unavailable at close, settings not flushed"),
        }
        true
    }

    /// The host this orchestrator drives.
    pub fn host(&self) -> &H {
        &self.host
    }

    fn snapshot(&self) -> HostSnapshot {
        HostSnapshot {
            documents: self.host.documents(),
            projects: self.host.projects(),
            workspace: self.host.workspace(),
            active_document: self.host.active_document(),
        }
    }
}

/// Builder for [`SaveOrchestrator`].
pub struct SaveOrchestratorBuilder<H: Host> {
    host: H,
    settings: Arc<dyn SettingsStore>,
    group: Option<String>,
    commands: bool,
    source: Option<Arc<dyn PolicySource>>,
    sink: Option<Arc<dyn StatusSink>>,
    exclusions: FocusExclusions,
}

impl<H: Host> std::fmt::Debug for SaveOrchestratorBuilder<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveOrchestratorBuilder")
            .field("group", &self.group)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}

impl<H: Host> SaveOrchestratorBuilder<H> {
    fn new(host: H, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            host,
            settings,
            group: None,
            commands: false,
            source: None,
            sink: None,
            exclusions: FocusExclusions::default(),
        }
    }

    /// Store settings under `group` instead of the default group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Enable the custom focus command capability.
    pub fn commands(mut self, enabled: bool) -> Self {
        self.commands = enabled;
        self
    }

    /// Live settings state. Defaults to a private [`SharedPolicy`].
    pub fn policy_source(mut self, source: Arc<dyn PolicySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Where status lines go. Without a sink they are only traced.
    pub fn status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Windows that never run the document-focus command.
    pub fn exclusions(mut self, exclusions: FocusExclusions) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Build the orchestrator. Call [`SaveOrchestrator::start`] before
    /// delivering events.
    pub fn build(self) -> SaveOrchestrator<H> {
        let status = self.sink.map(StatusLog::new).unwrap_or_default();
        let mut store = PolicyStore::new(self.settings)
            .with_commands(self.commands)
            .with_status(status.clone());
        if let Some(group) = self.group {
            store = store.with_group(group);
        }

        SaveOrchestrator {
            host: self.host,
            store,
            source: self
                .source
                .unwrap_or_else(|| Arc::new(SharedPolicy::new())),
            exclusions: self.exclusions,
            status,
            app_active: true,
        }
    }
}
