//! Audit record of one reconciliation run
//!
//! A [`Session`] is created when a run starts, filled in as each pass
//! completes and written once by the [`SessionRecorder`] when the run ends,
//! however it ends.

mod recorder;

pub use recorder::SessionRecorder;

use chrono::{DateTime, Utc};
use crumbs_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;
use crate::manifest::FileRecord;

/// A failure tied to one file, recorded instead of aborting the pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileError {
    pub path: NormalizedPath,
    /// Error kind, see [`Error::kind`]
    pub kind: String,
    pub message: String,
}

impl FileError {
    pub fn new(path: NormalizedPath, error: &Error) -> Self {
        Self {
            path,
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// A record before and after it was refreshed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub previous: FileRecord,
    pub current: FileRecord,
}

/// Result of one pass: the records it touched and the files it could not
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport<T> {
    /// True when the pass ran to completion without per-file errors
    pub succeeded: bool,
    pub records: Vec<T>,
    #[serde(default)]
    pub errors: Vec<FileError>,
}

impl<T> Default for PassReport<T> {
    fn default() -> Self {
        Self {
            succeeded: false,
            records: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> PassReport<T> {
    /// Close the report; it succeeds only if the pass was not interrupted
    /// and recorded no errors.
    pub(crate) fn close(&mut self, completed: bool) {
        self.succeeded = completed && self.errors.is_empty();
    }
}

/// Added files
pub type AddedReport = PassReport<FileRecord>;
/// Refreshed files
pub type UpdatedReport = PassReport<Modification>;
/// Files dropped from the manifest
pub type RemovedReport = PassReport<FileRecord>;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Cancelled,
    Failed { message: String },
}

/// Audit record of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    /// The root that was reconciled
    pub root: NormalizedPath,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    /// True only if the run completed and every pass reported no errors
    pub succeeded: bool,
    #[serde(default)]
    pub outcome: Option<RunOutcome>,
    #[serde(default)]
    pub removed: Option<RemovedReport>,
    #[serde(default)]
    pub updated: Option<UpdatedReport>,
    #[serde(default)]
    pub added: Option<AddedReport>,
}

impl Session {
    /// Start a session for `root` now
    pub fn start(root: NormalizedPath) -> Self {
        Self {
            id: Uuid::new_v4(),
            root,
            started_at: Utc::now(),
            ended_at: None,
            succeeded: false,
            outcome: None,
            removed: None,
            updated: None,
            added: None,
        }
    }

    /// Stamp the end time and derive the success flag.
    pub fn finish(&mut self, outcome: RunOutcome) {
        self.ended_at = Some(Utc::now());
        let reports_clean = [
            self.removed.as_ref().map(|r| r.succeeded),
            self.updated.as_ref().map(|r| r.succeeded),
            self.added.as_ref().map(|r| r.succeeded),
        ]
        .iter()
        .all(|ok| *ok == Some(true));
        self.succeeded = outcome == RunOutcome::Completed && reports_clean;
        self.outcome = Some(outcome);
    }

    /// Whether the run changed nothing
    pub fn is_noop(&self) -> bool {
        let empty = |len: Option<usize>| len.unwrap_or(0) == 0;
        empty(self.removed.as_ref().map(|r| r.records.len()))
            && empty(self.updated.as_ref().map(|r| r.records.len()))
            && empty(self.added.as_ref().map(|r| r.records.len()))
    }

    /// Total number of per-file errors across all passes
    pub fn error_count(&self) -> usize {
        self.removed.as_ref().map_or(0, |r| r.errors.len())
            + self.updated.as_ref().map_or(0, |r| r.errors.len())
            + self.added.as_ref().map_or(0, |r| r.errors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean<T>() -> PassReport<T> {
        let mut report = PassReport::default();
        report.close(true);
        report
    }

    #[test]
    fn succeeded_requires_every_pass_clean() {
        let mut session = Session::start("/data".into());
        session.removed = Some(clean());
        session.updated = Some(clean());
        session.added = Some(clean());
        session.finish(RunOutcome::Completed);

        assert!(session.succeeded);
        assert!(session.ended_at.is_some());
    }

    #[test]
    fn per_file_error_fails_session() {
        let mut session = Session::start("/data".into());
        session.removed = Some(clean());
        session.updated = Some(clean());
        let mut added: AddedReport = PassReport::default();
        added.errors.push(FileError::new(
            "/data/locked.bin".into(),
            &Error::Unreadable {
                path: "/data/locked.bin".into(),
                reason: "denied".into(),
            },
        ));
        added.close(true);
        session.added = Some(added);
        session.finish(RunOutcome::Completed);

        assert!(!session.succeeded);
        assert_eq!(session.error_count(), 1);
    }

    #[test]
    fn missing_pass_fails_session() {
        let mut session = Session::start("/data".into());
        session.removed = Some(clean());
        session.finish(RunOutcome::Cancelled);

        assert!(!session.succeeded);
        assert_eq!(session.outcome, Some(RunOutcome::Cancelled));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&RunOutcome::Failed {
            message: "disk full".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"failed","message":"disk full"}"#);
    }
}
