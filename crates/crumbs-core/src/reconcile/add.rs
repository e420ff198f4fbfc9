//! Add pass: fingerprint files that are on disk but not in the manifest

use tracing::{debug, info, warn};

use super::progress::{Operation, Progress};
use super::snapshot::DiskSnapshot;
use super::{PassOutcome, RunContext};
use crate::Result;
use crate::analyzer::ContentAnalyzer;
use crate::manifest::{FileRecord, Manifest};
use crate::session::FileError;

/// Insert a fresh record for every snapshot path without a manifest entry.
pub fn add_pass(
    manifest: &mut Manifest,
    snapshot: &DiskSnapshot,
    analyzer: &dyn ContentAnalyzer,
    ctx: &RunContext,
) -> Result<PassOutcome<FileRecord>> {
    let mut outcome = PassOutcome::default();
    let total = snapshot.len();

    for (idx, path) in snapshot.paths().iter().enumerate() {
        if ctx.is_cancelled() {
            info!(processed = idx, total, "Add pass cancelled");
            outcome.cancel();
            return Ok(outcome);
        }

        if !manifest.contains(&path.key()) {
            match analyzer.analyze_new(path) {
                Ok(record) => {
                    debug!(path = %record.path, "Added to manifest");
                    manifest.upsert(record.clone());
                    outcome.report.records.push(record);
                }
                Err(e) if e.is_per_file() => {
                    warn!(path = %path, error = %e, "Could not analyze file");
                    outcome.report.errors.push(FileError::new(path.clone(), &e));
                }
                Err(e) => return Err(e),
            }
        }

        ctx.report(Progress {
            operation: Operation::Add,
            processed: idx + 1,
            total,
        });
    }

    info!(
        added = outcome.report.records.len(),
        errors = outcome.report.errors.len(),
        "Add pass finished"
    );
    outcome.complete();
    Ok(outcome)
}
