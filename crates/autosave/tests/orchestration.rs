//! End-to-end tests driving the orchestrator against the mock host.
//!
//! Settings persist through the JSON file store in a temporary directory so
//! the startup and query-close checkpoints are exercised across restarts.

#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use autosave::mock::{HostCall, MockHost, RecordingSink};
use autosave::policy::DEFAULT_GROUP;
use autosave::settings::JsonFileSettingsStore;
use autosave::{
    EntityKind, EntityRef, FocusEvent, HostError, PolicySource, PolicyStore, SaveOrchestrator,
    SettingsStore, SharedPolicy, WorkspaceState,
};

fn doc(id: &str, dirty: bool) -> EntityRef {
    EntityRef::new(id, EntityKind::Document, format!("{id}.cs")).with_dirty(dirty)
}

fn project(id: &str, dirty: bool) -> EntityRef {
    EntityRef::new(id, EntityKind::Project, id).with_dirty(dirty)
}

fn workspace(dirty: bool) -> WorkspaceState {
    WorkspaceState {
        name: "/src/app.sln".to_string(),
        path: PathBuf::from("/src/app.sln"),
        dirty,
    }
}

fn settings_path(dir: &TempDir) -> PathBuf {
    dir.path().join("settings.json")
}

struct Harness {
    orchestrator: SaveOrchestrator<MockHost>,
    ui: SharedPolicy,
    sink: Arc<RecordingSink>,
}

fn start(host: MockHost, settings: &Path) -> Harness {
    let ui = SharedPolicy::new();
    let sink = Arc::new(RecordingSink::new());
    let mut orchestrator =
        SaveOrchestrator::builder(host, Arc::new(JsonFileSettingsStore::open(settings)))
            .policy_source(Arc::new(ui.clone()))
            .status_sink(sink.clone())
            .build();
    orchestrator.start();
    Harness {
        orchestrator,
        ui,
        sink,
    }
}

const DEACTIVATE: FocusEvent = FocusEvent::Application { active: false };

#[test]
fn test_documents_only_scenario() {
    let dir = TempDir::new().unwrap();
    let host = MockHost::new()
        .with_document(doc("a", true))
        .with_document(doc("b", true))
        .with_project(project("core", true))
        .with_workspace(workspace(false))
        .with_active("a");
    let mut h = start(host, &settings_path(&dir));

    let report = h.orchestrator.handle(&DEACTIVATE);
    assert!(report.is_clean());

    let host = h.orchestrator.host();
    assert_eq!(host.saved(), vec!["a", "b"]);
    assert_eq!(host.active(), Some("a".to_string()));
    assert_eq!(host.is_dirty("core"), Some(true));
    assert!(
        !host
            .calls()
            .iter()
            .any(|c| matches!(c, HostCall::SaveWorkspaceAs(_) | HostCall::SaveAll))
    );
    assert!(h.sink.contains("modified projects, but project autosave is off"));
    assert!(h.sink.contains("a.cs... saved"));
}

#[test]
fn test_all_flags_take_coarse_path() {
    let dir = TempDir::new().unwrap();
    let host = MockHost::new()
        .with_document(doc("a", true))
        .with_project(project("core", true))
        .with_workspace(workspace(true))
        .with_active("a");
    let mut h = start(host, &settings_path(&dir));
    h.ui.update(|f| {
        f.save_projects = true;
        f.save_solution = true;
    });

    h.orchestrator.handle(&DEACTIVATE);
    let host = h.orchestrator.host();
    assert_eq!(host.calls(), vec![HostCall::SaveAll]);
    assert_eq!(host.is_dirty("workspace"), Some(false));
}

#[test]
fn test_workspace_saved_to_own_path() {
    let dir = TempDir::new().unwrap();
    let host = MockHost::new().with_workspace(workspace(true));
    let mut h = start(host, &settings_path(&dir));
    h.ui.update(|f| f.save_solution = true);

    h.orchestrator.handle(&DEACTIVATE);
    assert_eq!(
        h.orchestrator.host().calls(),
        vec![HostCall::SaveWorkspaceAs(PathBuf::from("/src/app.sln"))]
    );
    assert!(h.sink.contains("Saving solution /src/app.sln... saved"));
}

#[test]
fn test_failing_save_reported_and_pass_continues() {
    let dir = TempDir::new().unwrap();
    let host = MockHost::new()
        .with_document(doc("a", true))
        .with_document(doc("b", true))
        .with_document(doc("c", true));
    host.fail_save("b", HostError::Failed("access denied".to_string()));
    let mut h = start(host, &settings_path(&dir));

    let report = h.orchestrator.handle(&DEACTIVATE);
    assert_eq!(report.failures().count(), 1);
    assert_eq!(h.orchestrator.host().saved(), vec!["a", "b", "c"]);
    assert_eq!(h.orchestrator.host().is_dirty("b"), Some(true));
    assert!(h.sink.contains("b.cs... failed: access denied"));
}

#[test]
fn test_settings_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = settings_path(&dir);

    let mut first = start(MockHost::new(), &path);
    first.ui.update(|f| {
        f.save_documents = false;
        f.save_single_document = true;
    });
    assert!(first.orchestrator.on_query_close());
    drop(first);

    let second = start(MockHost::new(), &path);
    let flags = second.ui.snapshot().unwrap();
    assert!(!flags.save_documents);
    assert!(flags.save_single_document);

    let store = JsonFileSettingsStore::open(&path);
    assert_eq!(
        store.get_string(DEFAULT_GROUP, "SaveFiles").unwrap().as_deref(),
        Some("False")
    );
}

#[test]
fn test_first_run_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = settings_path(&dir);
    let _h = start(MockHost::new(), &path);

    let store = Arc::new(JsonFileSettingsStore::open(&path));
    assert!(store.group_exists(DEFAULT_GROUP).unwrap());
    assert_eq!(
        store.get_string(DEFAULT_GROUP, "SaveProjects").unwrap().as_deref(),
        Some("False")
    );
    assert_eq!(PolicyStore::new(store).load(), autosave::PolicyFlags::default());
}

#[test]
fn test_single_document_while_app_active() {
    let dir = TempDir::new().unwrap();
    let host = MockHost::new()
        .with_document(doc("a", true))
        .with_document(doc("b", true));
    let mut h = start(host, &settings_path(&dir));
    h.ui.update(|f| {
        f.save_documents = false;
        f.save_single_document = true;
    });

    let event: FocusEvent = serde_json::from_str(
        r#"{"type": "window",
            "lost": {"caption": "a.cs", "document": {"id": "a", "kind": "document", "name": "a.cs", "dirty": true}},
            "gained": {"caption": "b.cs", "document": {"id": "b", "kind": "document", "name": "b.cs", "dirty": true}}}"#,
    )
    .unwrap();
    h.orchestrator.handle(&event);

    assert_eq!(h.orchestrator.host().saved(), vec!["a"]);
    assert_eq!(h.orchestrator.host().is_dirty("b"), Some(true));
}
