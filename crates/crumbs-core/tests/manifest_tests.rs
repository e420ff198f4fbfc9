//! Tests for the manifest and its store

use chrono::{TimeZone, Utc};
use crumbs_core::{Error, FileRecord, Manifest, ManifestStore};
use crumbs_fs::{Fingerprint, NormalizedPath};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::tempdir;

fn record(path: &str, size: u64) -> FileRecord {
    let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    FileRecord::new(
        NormalizedPath::new(path),
        Fingerprint {
            hash: format!("h{size}"),
            size,
            created: at,
            modified: at,
        },
        at,
    )
}

#[test]
fn test_manifest_json_shape() {
    let manifest = Manifest::from_records(vec![record("/a/x.txt", 10)]);

    let json = serde_json::to_string(&manifest).unwrap();

    insta::assert_snapshot!(json, @r###"{"fileCount":1,"totalSizeBytes":10,"files":[{"path":"/a/x.txt","contentHash":"h10","sizeBytes":10,"created":"2024-01-02T03:04:05Z","modified":"2024-01-02T03:04:05Z","checkedAt":"2024-01-02T03:04:05Z","addedAt":"2024-01-02T03:04:05Z"}]}"###);
}

#[test]
fn test_manifest_tolerates_missing_optional_fields() {
    let json = r#"{
        "files": [{
            "path": "C:\\Data\\x.txt",
            "sizeBytes": 4,
            "created": "2024-01-01T00:00:00Z",
            "modified": "2024-01-01T00:00:00Z",
            "checkedAt": "2024-01-01T00:00:00Z",
            "addedAt": "2024-01-01T00:00:00Z"
        }]
    }"#;

    let manifest: Manifest = serde_json::from_str(json).unwrap();

    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.records()[0].path.as_str(), "C:/Data/x.txt");
    assert_eq!(manifest.records()[0].content_hash, "");
    assert!(manifest.records()[0].updated_at.is_none());
    assert!(manifest.updated_at().is_none());
    assert!(manifest.contains(&NormalizedPath::new("c:/data/X.TXT").key()));
}

#[test]
fn test_store_save_then_load_preserves_records() {
    let dir = tempdir().unwrap();
    let store = ManifestStore::new(dir.path().join("manifest.json"));

    let mut manifest = Manifest::from_records(vec![record("/a/1", 1), record("/a/2", 2)]);
    store.save(&mut manifest).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.records(), manifest.records());
    assert_eq!(loaded.file_count(), 2);
    assert_eq!(loaded.total_size_bytes(), 3);
    assert_eq!(loaded.updated_at(), manifest.updated_at());
}

#[test]
fn test_store_save_refreshes_aggregates() {
    let dir = tempdir().unwrap();
    let store = ManifestStore::new(dir.path().join("manifest.json"));

    let mut manifest = Manifest::new();
    manifest.upsert(record("/a/1", 7));
    manifest.upsert(record("/a/2", 5));
    assert_eq!(manifest.file_count(), 0);

    store.save(&mut manifest).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path().to_native()).unwrap()).unwrap();
    assert_eq!(raw["fileCount"], 2);
    assert_eq!(raw["totalSizeBytes"], 12);
    assert!(raw["updatedAt"].is_string());
}

#[test]
fn test_store_load_missing_is_not_found() {
    let dir = tempdir().unwrap();
    let store = ManifestStore::new(dir.path().join("absent.json"));

    let err = store.load().unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "got {err:?}");
}

proptest! {
    #[test]
    fn prop_aggregates_match_records(sizes in proptest::collection::vec(0u64..1_000_000, 0..40)) {
        let mut manifest = Manifest::new();
        for (i, size) in sizes.iter().enumerate() {
            manifest.upsert(record(&format!("/p/{i}"), *size));
        }
        manifest.remove_where(|r| r.size_bytes % 3 == 0);
        manifest.refresh_aggregates();

        prop_assert_eq!(manifest.file_count(), manifest.records().len() as u64);
        prop_assert_eq!(
            manifest.total_size_bytes(),
            manifest.records().iter().map(|r| r.size_bytes).sum::<u64>()
        );
    }

    #[test]
    fn prop_keys_are_unique(names in proptest::collection::vec("[a-cA-C]{1,3}", 0..30)) {
        let mut manifest = Manifest::new();
        for name in &names {
            manifest.upsert(record(&format!("/d/{name}"), 1));
        }
        let distinct: std::collections::HashSet<String> =
            names.iter().map(|n| n.to_lowercase()).collect();
        prop_assert_eq!(manifest.len(), distinct.len());
        let keys: std::collections::HashSet<_> = manifest.records().iter().map(|r| r.key()).collect();
        prop_assert_eq!(keys.len(), distinct.len());
    }
}
