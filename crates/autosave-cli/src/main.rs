//! Autosave CLI - Replay focus scenarios against a simulated host
//!
//! Usage:
//!   autosave scenario.json               Replay a scenario file
//!   autosave --settings s.json sc.json   Persist policy to a settings file
//!   autosave                             Read the scenario from stdin
//!
//! A scenario describes the open documents, projects and workspace, then a
//! list of steps: focus events, settings UI edits, dirty-state changes and
//! the query-close checkpoint. Status lines are printed to stdout.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use autosave::mock::MockHost;
use autosave::settings::{JsonFileSettingsStore, MemorySettingsStore};
use autosave::{
    EntityRef, FocusEvent, PolicyFlags, PolicySource, SaveOrchestrator, SettingsStore,
    SharedPolicy, SinkError, StatusSink, WorkspaceState,
};

/// Replay focus scenarios against the autosave orchestrator
#[derive(Parser, Debug)]
#[command(name = "autosave")]
#[command(about = "Replay focus scenarios against a simulated host")]
struct Args {
    /// Scenario file (reads stdin when omitted)
    scenario: Option<PathBuf>,

    /// Settings file; overrides the scenario's own `settings` entry
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Settings group to store the policy under
    #[arg(long)]
    group: Option<String>,

    /// Enable the custom focus command capability
    #[arg(long)]
    commands: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Scenario {
    #[serde(default)]
    documents: Vec<EntityRef>,
    #[serde(default)]
    projects: Vec<EntityRef>,
    #[serde(default)]
    workspace: Option<WorkspaceState>,
    #[serde(default)]
    active: Option<String>,
    #[serde(default)]
    settings: Option<PathBuf>,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
enum Step {
    /// Deliver a focus notification
    Event { event: FocusEvent },
    /// Replace the settings UI state
    Policy { flags: PolicyFlags },
    /// Change an entity's dirty flag
    Dirty { id: String, dirty: bool },
    /// The host is about to close
    Close,
}

/// Status sink writing to stdout, falling back to stderr.
#[derive(Debug)]
struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn output(&self, line: &str) -> Result<(), SinkError> {
        writeln!(io::stdout(), "{line}").map_err(|e| SinkError::Unavailable(e.to_string()))
    }

    fn notify(&self, line: &str) -> Result<(), SinkError> {
        writeln!(io::stderr(), "autosave: {line}")
            .map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so stdout only carries status lines
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let args = Args::parse();

    let text = match &args.scenario {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read scenario from stdin")?;
            text
        }
    };
    let scenario: Scenario = serde_json::from_str(&text).context("invalid scenario")?;

    let settings: Arc<dyn SettingsStore> = match args.settings.or(scenario.settings) {
        Some(path) => Arc::new(JsonFileSettingsStore::open(path)),
        None => Arc::new(MemorySettingsStore::new()),
    };

    let mut host = MockHost::new();
    for document in scenario.documents {
        host = host.with_document(document);
    }
    for project in scenario.projects {
        host = host.with_project(project);
    }
    if let Some(workspace) = scenario.workspace {
        host = host.with_workspace(workspace);
    }
    if let Some(active) = &scenario.active {
        host = host.with_active(active);
    }

    let ui = SharedPolicy::new();
    let mut builder = SaveOrchestrator::builder(host, settings)
        .commands(args.commands)
        .policy_source(Arc::new(ui.clone()))
        .status_sink(Arc::new(ConsoleSink));
    if let Some(group) = args.group {
        builder = builder.group(group);
    }
    let mut orchestrator = builder.build();
    orchestrator.start();

    let mut failures = 0;
    for step in scenario.steps {
        match step {
            Step::Event { event } => {
                let report = orchestrator.handle(&event);
                failures += report.failures().count();
            }
            Step::Policy { flags } => ui.publish(flags),
            Step::Dirty { id, dirty } => {
                if !orchestrator.host().set_dirty(&id, dirty) {
                    tracing::warn!(id = %id, "dirty step names an unknown entity");
                }
            }
            Step::Close => {
                orchestrator.on_query_close();
            }
        }
    }

    tracing::info!(calls = orchestrator.host().calls().len(), failures, "scenario finished");
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
