//! Shared output formatting

use colored::{ColoredString, Colorize};
use crumbs_core::{RunOutcome, Session};

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Human-readable byte count: `512 B`, `1.5 KiB`, `3.2 GiB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Colored one-word outcome of a session.
pub fn outcome_label(session: &Session) -> ColoredString {
    match &session.outcome {
        Some(RunOutcome::Completed) if session.succeeded => "completed".green(),
        Some(RunOutcome::Completed) => "completed with errors".yellow(),
        Some(RunOutcome::Cancelled) => "cancelled".yellow(),
        Some(RunOutcome::Failed { .. }) => "failed".red(),
        None => "unfinished".dimmed(),
    }
}

/// Added, updated and removed record counts.
pub fn change_counts(session: &Session) -> (usize, usize, usize) {
    (
        session.added.as_ref().map_or(0, |r| r.records.len()),
        session.updated.as_ref().map_or(0, |r| r.records.len()),
        session.removed.as_ref().map_or(0, |r| r.records.len()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_below_one_kib_are_exact() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
    }

    #[test]
    fn bytes_scale_through_units() {
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(format_bytes(3 * 1024u64.pow(5)), "3072.0 TiB");
    }
}
