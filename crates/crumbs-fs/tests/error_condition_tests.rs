//! Tests for error handling under adverse filesystem conditions

use crumbs_fs::{Error, NormalizedPath, RobustnessConfig, Walker, fingerprint, io};
use std::fs;
use tempfile::tempdir;

#[test]
fn write_atomic_cleans_up_temp_file_on_success() {
    let dir = tempdir().unwrap();
    let path = NormalizedPath::new(dir.path().join("manifest.json"));

    io::write_atomic(&path, b"{}", RobustnessConfig::default()).unwrap();

    // The temp file pattern is .{filename}.{pid}.tmp
    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();

    assert!(
        leftovers.is_empty(),
        "No temp files should remain after a successful write, found: {:?}",
        leftovers.iter().map(|e| e.file_name()).collect::<Vec<_>>()
    );
}

#[test]
fn fingerprint_of_deleted_file_is_unreadable() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("short-lived.txt");
    fs::write(&file_path, "x").unwrap();
    fs::remove_file(&file_path).unwrap();

    let result = fingerprint::fingerprint(&file_path);
    assert!(matches!(result, Err(Error::Unreadable { .. })));
}

#[cfg(unix)]
mod unix_tests {
    use super::*;
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    fn is_root() -> bool {
        match std::process::Command::new("id").arg("-u").output() {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(_) => false,
        }
    }

    #[test]
    fn fingerprint_permission_denied_is_unreadable() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("secret.txt");
        fs::write(&file_path, "secret content").unwrap();
        fs::set_permissions(&file_path, Permissions::from_mode(0o000)).unwrap();

        let result = fingerprint::fingerprint(&file_path);

        let _ = fs::set_permissions(&file_path, Permissions::from_mode(0o644));
        assert!(matches!(result, Err(Error::Unreadable { .. })));
    }

    #[test]
    fn walk_skips_unreadable_subtree_and_continues() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("hidden.txt"), "h").unwrap();
        fs::create_dir_all(dir.path().join("open")).unwrap();
        fs::write(dir.path().join("open/visible.txt"), "v").unwrap();
        fs::set_permissions(&locked, Permissions::from_mode(0o000)).unwrap();

        let files = Walker::new(dir.path()).walk();

        let _ = fs::set_permissions(&locked, Permissions::from_mode(0o755));
        let names: Vec<_> = files.iter().filter_map(|p| p.file_name()).collect();
        assert_eq!(names, vec!["visible.txt"]);
    }

    #[test]
    fn walk_does_not_follow_symlinks_by_default() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("real.txt");
        fs::write(&target, "r").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

        let plain = Walker::new(dir.path()).walk();
        let followed = Walker::new(dir.path()).follow_symlinks(true).walk();

        assert_eq!(plain.len(), 1);
        assert_eq!(followed.len(), 2);
    }

    #[test]
    fn write_atomic_unwritable_parent_preserves_original() {
        if is_root() {
            eprintln!("Skipping test: running as root bypasses permission checks");
            return;
        }
        let dir = tempdir().unwrap();
        let parent = dir.path().join("parent");
        fs::create_dir(&parent).unwrap();

        let file_path = parent.join("manifest.json");
        fs::write(&file_path, "original").unwrap();
        fs::set_permissions(&parent, Permissions::from_mode(0o555)).unwrap();

        let path = NormalizedPath::new(&file_path);
        let result = io::write_atomic(&path, b"new content", RobustnessConfig::default());

        let _ = fs::set_permissions(&parent, Permissions::from_mode(0o755));

        assert!(result.is_err(), "Writing when parent is read-only should fail");
        let content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(
            content, "original",
            "Original file content must be preserved when write fails"
        );
    }
}
