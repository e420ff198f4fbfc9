//! Multi-run scenarios over the public API
//!
//! Each scenario drives a directory through several rounds of changes and
//! checks the manifest and the session trail after every run.

use std::collections::BTreeMap;

use crumbs_core::{
    Config, ManifestStore, Reconciler, RunContext, RunOutcome, SessionRecorder,
};
use crumbs_fs::checksum::compute_content_checksum;
use crumbs_test_utils::TestTree;
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn engine(tree: &TestTree) -> Reconciler {
    Reconciler::new(
        ManifestStore::new(tree.manifest_path()),
        SessionRecorder::new(tree.sessions_dir()),
    )
}

/// File name -> content hash, as recorded in the manifest
fn recorded(tree: &TestTree) -> BTreeMap<String, String> {
    ManifestStore::new(tree.manifest_path())
        .load()
        .unwrap()
        .records()
        .iter()
        .map(|r| {
            let name = r.path.as_str().rsplit('/').next().unwrap().to_string();
            (name, r.content_hash.clone())
        })
        .collect()
}

// =============================================================================
// Scenario 1: A directory evolving over several runs
// =============================================================================

#[test]
fn scenario_directory_evolves_across_runs() {
    let tree = TestTree::new();
    let engine = engine(&tree);

    // Round 1: initial inventory
    tree.write("notes.txt", "first draft");
    tree.write("photos/cat.jpg", [7u8; 64]);
    let s1 = engine.run(tree.root(), &RunContext::new()).unwrap();
    assert_eq!(s1.added.as_ref().unwrap().records.len(), 2);

    // Round 2: edit, delete, create
    tree.write("notes.txt", "second draft, longer");
    tree.remove("photos/cat.jpg");
    tree.write("photos/dog.jpg", [9u8; 32]);
    let s2 = engine.run(tree.root(), &RunContext::new()).unwrap();
    assert_eq!(s2.updated.as_ref().unwrap().records.len(), 1);
    assert_eq!(s2.removed.as_ref().unwrap().records.len(), 1);
    assert_eq!(s2.added.as_ref().unwrap().records.len(), 1);

    // Round 3: nothing changed
    let s3 = engine.run(tree.root(), &RunContext::new()).unwrap();
    assert!(s3.is_noop());
    assert!(s3.succeeded);

    let expected: BTreeMap<String, String> = [
        ("notes.txt".to_string(), compute_content_checksum("second draft, longer")),
        (
            "dog.jpg".to_string(),
            crumbs_fs::checksum::compute_file_checksum(&tree.path("photos/dog.jpg")).unwrap(),
        ),
    ]
    .into_iter()
    .collect();
    assert_eq!(recorded(&tree), expected);

    let sessions = engine.recorder().list().unwrap();
    assert_eq!(sessions.len(), 3);
    let ids: Vec<_> = sessions
        .iter()
        .map(|p| engine.recorder().load(p).unwrap().id)
        .collect();
    assert_eq!(ids, vec![s1.id, s2.id, s3.id]);
}

// =============================================================================
// Scenario 2: Emptying the directory
// =============================================================================

#[test]
fn scenario_emptied_directory_clears_manifest() {
    let tree = TestTree::new();
    let engine = engine(&tree);
    tree.write("a", "a");
    tree.write("b/c", "c");
    engine.run(tree.root(), &RunContext::new()).unwrap();

    tree.remove("a");
    tree.remove("b/c");
    let session = engine.run(tree.root(), &RunContext::new()).unwrap();

    assert_eq!(session.removed.as_ref().unwrap().records.len(), 2);
    let manifest = engine.store().load().unwrap();
    assert!(manifest.is_empty());
    assert_eq!(manifest.total_size_bytes(), 0);
}

// =============================================================================
// Scenario 3: Configuration-driven setup
// =============================================================================

#[test]
fn scenario_config_file_drives_engine() {
    let tree = TestTree::new();
    tree.write("report.pdf", "%PDF");
    let config_path = tree.state().join("crumbs.yaml");
    std::fs::write(
        &config_path,
        "manifest: inventory.json\nsessions: history\nfollow_symlinks: false\n",
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();
    let session = Reconciler::from_config(&config)
        .run(tree.root(), &RunContext::new())
        .unwrap();

    assert_eq!(session.outcome, Some(RunOutcome::Completed));
    assert!(tree.state().join("inventory.json").is_file());
    assert_eq!(tree.state().join("history").read_dir().unwrap().count(), 1);
}

// =============================================================================
// Scenario 4: Resuming after an interrupted run
// =============================================================================

#[test]
fn scenario_run_after_cancellation_finishes_the_work() {
    let tree = TestTree::new();
    let engine = engine(&tree);
    for i in 0..5 {
        tree.write(&format!("f{i}.txt"), format!("file {i}"));
    }

    let token = crumbs_core::CancellationToken::new();
    let trigger = token.clone();
    let ctx = RunContext::new()
        .with_cancellation(token)
        .with_progress(move |p: crumbs_core::Progress| {
            if p.operation == crumbs_core::Operation::Add && p.processed == 2 {
                trigger.cancel();
            }
        });
    assert!(engine.run(tree.root(), &ctx).is_err());
    assert_eq!(engine.store().load().unwrap().file_count(), 2);

    let session = engine.run(tree.root(), &RunContext::new()).unwrap();
    assert_eq!(session.added.as_ref().unwrap().records.len(), 3);
    assert_eq!(engine.store().load().unwrap().file_count(), 5);

    let outcomes: Vec<_> = engine
        .recorder()
        .list()
        .unwrap()
        .iter()
        .map(|p| engine.recorder().load(p).unwrap().outcome)
        .collect();
    assert_eq!(
        outcomes,
        vec![Some(RunOutcome::Cancelled), Some(RunOutcome::Completed)]
    );
}
