//! Manifest reconciliation for crumbs
//!
//! This crate keeps a persisted inventory of the files under a root
//! directory in line with what is actually on disk, and writes an audit
//! record of every run:
//!
//! - **Manifest**: [`FileRecord`]s keyed case-insensitively by path, with
//!   aggregate count and size, persisted by [`ManifestStore`]
//! - **Reconciler**: the remove, update and add passes driven by
//!   [`Reconciler::run`]
//! - **Sessions**: per-pass reports and run outcome, persisted by
//!   [`SessionRecorder`]
//! - **Configuration**: where the manifest and sessions live ([`Config`])
//!
//! # Architecture
//!
//! ```text
//!              crumbs-cli
//!                  |
//!             crumbs-core
//!   (manifest, reconcile, session)
//!                  |
//!              crumbs-fs
//!  (paths, walk, fingerprint, atomic io)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use crumbs_core::{ManifestStore, Reconciler, RunContext, SessionRecorder};
//!
//! fn example() -> crumbs_core::Result<()> {
//!     let reconciler = Reconciler::new(
//!         ManifestStore::new("/var/lib/crumbs/manifest.json"),
//!         SessionRecorder::new("/var/lib/crumbs/sessions"),
//!     );
//!     let session = reconciler.run("/data", &RunContext::new())?;
//!     println!("{} errors", session.error_count());
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod config;
pub mod error;
pub mod manifest;
pub mod reconcile;
pub mod session;

pub use analyzer::{ContentAnalyzer, FsAnalyzer};
pub use config::Config;
pub use error::{Error, Result};
pub use manifest::{FileRecord, Manifest, ManifestStore};
pub use reconcile::{
    CancellationToken, DiskSnapshot, NoProgress, Operation, PassOutcome, Progress, ProgressSink,
    Reconciler, RunContext,
};
pub use session::{
    AddedReport, FileError, Modification, PassReport, RemovedReport, RunOutcome, Session,
    SessionRecorder, UpdatedReport,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn store_failure_display_names_path() {
        let error = Error::store(
            "/state/manifest.json",
            crumbs_fs::Error::LockFailed {
                path: PathBuf::from("/state/manifest.json"),
            },
        );

        let display = error.to_string();
        assert!(
            display.contains("/state/manifest.json"),
            "Error display should contain the path, got: {}",
            display
        );
        assert_eq!(error.kind(), "store-failure");
    }

    #[test]
    fn missing_store_file_stays_not_found() {
        let error = Error::store(
            "/state/manifest.json",
            crumbs_fs::Error::NotFound {
                path: PathBuf::from("/state/manifest.json"),
            },
        );
        assert!(matches!(error, Error::NotFound { .. }));
        assert!(!error.is_per_file());
    }
}
