//! Remove pass: drop records whose path is no longer on disk

use tracing::{debug, info};

use super::progress::{Operation, Progress};
use super::snapshot::DiskSnapshot;
use super::{PassOutcome, RunContext};
use crate::manifest::{FileRecord, Manifest};

/// How often the cheap removal scan looks at the cancellation flag
const CHECK_INTERVAL: usize = 1000;

/// Remove every record whose key is absent from `snapshot`.
///
/// Cancellation is honoured at the top of the pass and every
/// [`CHECK_INTERVAL`] records; records judged missing before the stop are
/// still removed, so the manifest reflects the work done.
pub fn remove_pass(manifest: &mut Manifest, snapshot: &DiskSnapshot, ctx: &RunContext) -> PassOutcome<FileRecord> {
    let mut outcome = PassOutcome::default();
    if ctx.is_cancelled() {
        outcome.cancel();
        return outcome;
    }

    let total = manifest.len();
    let mut seen = 0usize;
    let mut stopped = false;
    let removed = manifest.remove_where(|record| {
        if stopped {
            return false;
        }
        seen += 1;
        let missing = !snapshot.contains(&record.key());
        if missing {
            debug!(path = %record.path, "No longer on disk");
        }
        ctx.report(Progress {
            operation: Operation::Remove,
            processed: seen,
            total,
        });
        if seen % CHECK_INTERVAL == 0 && ctx.is_cancelled() {
            stopped = true;
        }
        missing
    });

    for record in &removed {
        info!(path = %record.path, "Removed from manifest");
    }
    info!(removed = removed.len(), "Remove pass finished");

    outcome.report.records = removed;
    if stopped {
        outcome.cancel();
    } else {
        outcome.complete();
    }
    outcome
}
