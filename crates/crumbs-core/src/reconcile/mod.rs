//! The reconciliation engine
//!
//! A run validates the root, takes one snapshot of the files on disk, makes
//! sure a manifest exists, then runs three passes in a fixed order:
//!
//! 1. **remove**: records whose path is gone are dropped
//! 2. **update**: records whose size or mtime changed are re-fingerprinted
//! 3. **add**: paths without a record are fingerprinted and inserted
//!
//! Removal runs first so that a path that vanished and was replaced is
//! treated as remove-then-add rather than as an in-place update. The manifest
//! is saved after every pass. The session is written exactly once when the
//! run ends, whether it completed, was cancelled or failed.

mod add;
mod cancel;
mod progress;
mod remove;
mod snapshot;
mod update;

pub use add::add_pass;
pub use cancel::CancellationToken;
pub use progress::{NoProgress, Operation, Progress, ProgressSink};
pub use remove::remove_pass;
pub use snapshot::DiskSnapshot;
pub use update::update_pass;

use std::path::{Path, PathBuf};

use crumbs_fs::{NormalizedPath, Walker, walk::absolutize};
use tracing::{error, info};

use crate::analyzer::{ContentAnalyzer, FsAnalyzer};
use crate::config::Config;
use crate::manifest::{Manifest, ManifestStore};
use crate::session::{PassReport, RunOutcome, Session, SessionRecorder};
use crate::{Error, Result};

/// Caller-supplied signalling for one run: a cancellation token and a
/// progress sink.
pub struct RunContext {
    cancel: CancellationToken,
    progress: Box<dyn ProgressSink>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            progress: Box::new(NoProgress),
        }
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn report(&self, progress: Progress) {
        self.progress.report(progress);
    }
}

/// What a pass hands back to the engine
#[derive(Debug)]
pub struct PassOutcome<T> {
    pub report: PassReport<T>,
    /// The pass stopped early because cancellation was requested
    pub cancelled: bool,
}

impl<T> Default for PassOutcome<T> {
    fn default() -> Self {
        Self {
            report: PassReport::default(),
            cancelled: false,
        }
    }
}

impl<T> PassOutcome<T> {
    pub(crate) fn cancel(&mut self) {
        self.cancelled = true;
        self.report.close(false);
    }

    pub(crate) fn complete(&mut self) {
        self.report.close(true);
    }
}

/// Keeps a manifest in line with the files under a root directory.
pub struct Reconciler {
    store: ManifestStore,
    recorder: SessionRecorder,
    analyzer: Box<dyn ContentAnalyzer>,
    follow_symlinks: bool,
    excluded: Vec<PathBuf>,
}

impl Reconciler {
    /// Create an engine that keeps its manifest in `store` and writes
    /// sessions through `recorder`.
    ///
    /// Both locations are excluded from every walk, so they are never
    /// tracked even when they live under the root.
    pub fn new(store: ManifestStore, recorder: SessionRecorder) -> Self {
        let excluded = vec![store.path().to_native(), recorder.dir().to_native()];
        Self {
            store,
            recorder,
            analyzer: Box::new(FsAnalyzer),
            follow_symlinks: false,
            excluded,
        }
    }

    /// Create an engine from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut reconciler = Self::new(
            ManifestStore::new(config.manifest.clone()),
            SessionRecorder::new(config.sessions.clone()),
        )
        .follow_symlinks(config.follow_symlinks);
        if let Some(log_file) = &config.log_file {
            reconciler = reconciler.exclude(log_file);
        }
        reconciler
    }

    pub fn with_analyzer(mut self, analyzer: impl ContentAnalyzer + 'static) -> Self {
        self.analyzer = Box::new(analyzer);
        self
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Never track `path` (or anything below it).
    pub fn exclude(mut self, path: impl AsRef<Path>) -> Self {
        self.excluded.push(path.as_ref().to_path_buf());
        self
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    /// Reconcile the manifest with the files under `root`.
    ///
    /// Returns the finished session. On cancellation this returns
    /// [`Error::Cancelled`] and on any fatal failure the failing error; in
    /// both cases the manifest holds whatever the interrupted pass managed
    /// and the session has already been recorded. A blank or missing root
    /// fails with [`Error::InvalidInput`] before any session exists.
    pub fn run(&self, root: impl AsRef<Path>, ctx: &RunContext) -> Result<Session> {
        let root = validate_root(root.as_ref())?;

        let mut guard = SessionGuard::new(Session::start(NormalizedPath::new(&root)), &self.recorder);
        let result = self.reconcile(&root, ctx, &mut guard.session);

        let outcome = match &result {
            Ok(()) => {
                info!(root = %root.display(), "Scan completed");
                RunOutcome::Completed
            }
            Err(Error::Cancelled) => {
                info!(root = %root.display(), "Scan cancelled");
                RunOutcome::Cancelled
            }
            Err(e) => {
                error!(root = %root.display(), error = %e, "Scan failed");
                RunOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        let session = guard.finish(outcome);
        result.map(|()| session)
    }

    fn walker(&self, root: &Path) -> Walker {
        self.excluded.iter().fold(
            Walker::new(root).follow_symlinks(self.follow_symlinks),
            |walker, path| walker.exclude(path),
        )
    }

    fn reconcile(&self, root: &Path, ctx: &RunContext, session: &mut Session) -> Result<()> {
        info!(root = %root.display(), "Starting scan");
        let snapshot = DiskSnapshot::capture(&self.walker(root));
        info!(files = snapshot.len(), "Collected files from disk");

        if self.store.bootstrap()? {
            info!(path = %self.store.path(), "Created empty manifest");
        }
        let mut manifest = self.store.load()?;

        let removed = remove_pass(&mut manifest, &snapshot, ctx);
        self.settle(&mut manifest, removed, &mut session.removed)?;

        let updated = update_pass(&mut manifest, &snapshot, self.analyzer.as_ref(), ctx)?;
        self.settle(&mut manifest, updated, &mut session.updated)?;

        let added = add_pass(&mut manifest, &snapshot, self.analyzer.as_ref(), ctx)?;
        self.settle(&mut manifest, added, &mut session.added)?;

        Ok(())
    }

    /// Record a pass's report, save the manifest and turn a cancelled pass
    /// into [`Error::Cancelled`].
    ///
    /// After cancellation the save is best effort: a failure is logged and
    /// cancellation still propagates.
    fn settle<T>(
        &self,
        manifest: &mut Manifest,
        outcome: PassOutcome<T>,
        slot: &mut Option<PassReport<T>>,
    ) -> Result<()> {
        *slot = Some(outcome.report);
        match self.store.save(manifest) {
            Ok(()) => {}
            Err(e) if outcome.cancelled => {
                error!(error = %e, "Failed to save partial manifest after cancellation");
            }
            Err(e) => return Err(e),
        }
        if outcome.cancelled {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

fn validate_root(root: &Path) -> Result<PathBuf> {
    if crate::config::is_blank(root) {
        let err = Error::invalid_input("Root path cannot be blank");
        error!(error = %err, "Refusing to scan");
        return Err(err);
    }
    if !root.is_dir() {
        let err = Error::invalid_input(format!(
            "Root path does not exist or is not a directory: {}",
            root.display()
        ));
        error!(error = %err, "Refusing to scan");
        return Err(err);
    }
    Ok(absolutize(root))
}

/// Writes the session when the run ends, on every exit path.
///
/// [`SessionGuard::finish`] is the normal path. If the guard is dropped
/// without it (a panic unwinding through the run), the session is recorded
/// as failed from `Drop`.
struct SessionGuard<'a> {
    session: Session,
    recorder: &'a SessionRecorder,
    finished: bool,
}

impl<'a> SessionGuard<'a> {
    fn new(session: Session, recorder: &'a SessionRecorder) -> Self {
        Self {
            session,
            recorder,
            finished: false,
        }
    }

    fn finish(mut self, outcome: RunOutcome) -> Session {
        self.finished = true;
        self.session.finish(outcome);
        record(self.recorder, &self.session);
        self.session.clone()
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.session.finish(RunOutcome::Failed {
            message: "run aborted".to_string(),
        });
        record(self.recorder, &self.session);
    }
}

/// Session persistence failures are logged and never change the outcome.
fn record(recorder: &SessionRecorder, session: &Session) {
    match recorder.finalize(session) {
        Ok(path) => info!(path = %path, succeeded = session.succeeded, "Session recorded"),
        Err(e) => error!(error = %e, id = %session.id, "Failed to record session"),
    }
}
