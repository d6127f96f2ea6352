//! Autosave: save on focus loss
//!
//! Autosave watches the focus notifications of a host editor and saves
//! modified work when the user leaves it. Which entities get saved is
//! decided by a small persisted policy; the host itself is reached through
//! the [`Host`] trait so that the orchestration logic can run against any
//! editor, or against the in-memory [`mock::MockHost`].

mod host;
mod status;

pub mod mock;
pub mod orchestrator;
pub mod policy;
pub mod settings;

pub use host::{
    EntityId, EntityKind, EntityRef, FocusEvent, Host, HostError, SaveStatus, WindowRef,
    WorkspaceState,
};
pub use orchestrator::{
    ActionOutcome, ActionResult, HostSnapshot, PassReport, PlanStep, SaveAction,
    SaveOrchestrator, SaveOrchestratorBuilder, SavePlan,
};
pub use policy::{
    FocusCommands, FocusExclusions, HostCommand, PolicyFlags, PolicySource, PolicyStore,
    SharedPolicy,
};
pub use settings::{SettingsStore, StoreError};
pub use status::{SinkError, StatusLog, StatusSink};
