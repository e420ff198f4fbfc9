//! Property tests: after any sequence of changes, one run brings the
//! manifest exactly in line with the disk.

use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use crumbs_core::{ManifestStore, Reconciler, RunContext, SessionRecorder};
use crumbs_fs::checksum::compute_content_checksum;
use crumbs_test_utils::TestTree;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Change {
    Write(u8, String),
    Delete(u8),
}

fn change() -> impl Strategy<Value = Change> {
    prop_oneof![
        (0u8..6, "[a-z]{0,24}").prop_map(|(slot, content)| Change::Write(slot, content)),
        (0u8..6).prop_map(Change::Delete),
    ]
}

fn file_name(slot: u8) -> String {
    format!("dir{}/file{slot}.txt", slot % 2)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn manifest_matches_disk_after_each_run(
        rounds in proptest::collection::vec(proptest::collection::vec(change(), 1..5), 1..4)
    ) {
        let tree = TestTree::new();
        let engine = Reconciler::new(
            ManifestStore::new(tree.manifest_path()),
            SessionRecorder::new(tree.sessions_dir()),
        );
        let mut disk: BTreeMap<String, String> = BTreeMap::new();
        // Every write gets a distinct, increasing mtime so same-size rewrites
        // are still visible regardless of timestamp granularity.
        let epoch = SystemTime::now();
        let mut writes = 0u64;

        for round in rounds {
            for change in round {
                match change {
                    Change::Write(slot, content) => {
                        let name = file_name(slot);
                        tree.write(&name, &content);
                        writes += 1;
                        tree.set_modified(&name, epoch + Duration::from_secs(writes));
                        disk.insert(name, content);
                    }
                    Change::Delete(slot) => {
                        let name = file_name(slot);
                        if disk.remove(&name).is_some() {
                            tree.remove(&name);
                        }
                    }
                }
            }

            let session = engine.run(tree.root(), &RunContext::new()).unwrap();
            prop_assert!(session.succeeded);

            let manifest = engine.store().load().unwrap();
            prop_assert_eq!(manifest.file_count() as usize, disk.len());
            prop_assert_eq!(
                manifest.total_size_bytes(),
                disk.values().map(|c| c.len() as u64).sum::<u64>()
            );
            for (name, content) in &disk {
                let expected = compute_content_checksum(content);
                let found = manifest
                    .records()
                    .iter()
                    .find(|r| r.path.as_str().ends_with(name.as_str()))
                    .map(|r| r.content_hash.clone());
                prop_assert_eq!(found, Some(expected));
            }

            let again = engine.run(tree.root(), &RunContext::new()).unwrap();
            prop_assert!(again.is_noop());
        }
    }
}
