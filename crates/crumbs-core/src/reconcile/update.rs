//! Update pass: refresh records whose size or mtime changed on disk

use chrono::Utc;
use tracing::{debug, info, warn};

use super::progress::{Operation, Progress};
use super::snapshot::DiskSnapshot;
use super::{PassOutcome, RunContext};
use crate::Result;
use crate::analyzer::ContentAnalyzer;
use crate::manifest::Manifest;
use crate::session::{FileError, Modification};

/// Re-fingerprint every record whose on-disk signature no longer matches.
///
/// Files that vanished or cannot be read are reported as per-file errors and
/// left untouched; removal is the remove pass's job alone. Unchanged files
/// are never rehashed. Any other error aborts the pass.
///
/// A record whose path now differs from the walked spelling only in case
/// (a case-only rename on a case-sensitive filesystem) is moved to the walked
/// spelling and reported as a modification.
pub fn update_pass(
    manifest: &mut Manifest,
    snapshot: &DiskSnapshot,
    analyzer: &dyn ContentAnalyzer,
    ctx: &RunContext,
) -> Result<PassOutcome<Modification>> {
    let mut outcome = PassOutcome::default();
    let total = manifest.len();

    for idx in 0..total {
        if ctx.is_cancelled() {
            info!(processed = idx, total, "Update pass cancelled");
            outcome.cancel();
            return Ok(outcome);
        }

        let previous = manifest.records()[idx].clone();
        let located = match snapshot.resolve(&previous.path) {
            Some(on_disk) if *on_disk != previous.path => {
                debug!(from = %previous.path, to = %on_disk, "Path spelling changed on disk");
                previous.respelled(on_disk.clone(), Utc::now())
            }
            _ => previous.clone(),
        };
        let respelled = located.path != previous.path;

        let changed = analyzer.signature(&located.path).and_then(|signature| {
            if !located.is_current(&signature) {
                analyzer.analyze_existing(&located).map(Some)
            } else if respelled {
                Ok(Some(located.clone()))
            } else {
                Ok(None)
            }
        });

        match changed {
            Ok(Some(current)) => {
                debug!(path = %current.path, "Content refreshed");
                manifest.upsert(current.clone());
                outcome.report.records.push(Modification { previous, current });
            }
            Ok(None) => {}
            Err(e) if e.is_per_file() => {
                warn!(path = %located.path, error = %e, "Could not refresh file");
                outcome.report.errors.push(FileError::new(located.path.clone(), &e));
            }
            Err(e) => return Err(e),
        }

        ctx.report(Progress {
            operation: Operation::Update,
            processed: idx + 1,
            total,
        });
    }

    info!(
        updated = outcome.report.records.len(),
        errors = outcome.report.errors.len(),
        "Update pass finished"
    );
    outcome.complete();
    Ok(outcome)
}
