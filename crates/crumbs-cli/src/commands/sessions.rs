//! Sessions command implementation

use colored::Colorize;
use crumbs_core::{Config, Session, SessionRecorder};
use tracing::warn;

use crate::error::Result;
use crate::format::{change_counts, outcome_label};

/// Run the sessions command
pub fn run_sessions(config: &Config, limit: usize, json: bool) -> Result<()> {
    let recorder = SessionRecorder::new(config.sessions.clone());
    let sessions: Vec<Session> = recorder
        .list()?
        .iter()
        .rev()
        .take(limit)
        .filter_map(|path| match recorder.load(path) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %path, error = %e, "Skipping unreadable session file");
                None
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{}", "No sessions recorded".dimmed());
        println!("{}: {}", "Directory".dimmed(), recorder.dir());
        return Ok(());
    }

    println!("{}", "Sessions".bold());
    println!();
    for session in &sessions {
        let (added, updated, removed) = change_counts(session);
        let errors = session.error_count();
        let errors = if errors > 0 {
            format!("{errors} errors").yellow()
        } else {
            "no errors".dimmed()
        };
        println!(
            "  {}  {} {} {} {}  {}  {}",
            session.started_at.format("%Y-%m-%d %H:%M:%S"),
            outcome_label(session),
            format!("+{added}").green(),
            format!("~{updated}").cyan(),
            format!("-{removed}").red(),
            errors,
            session.root.to_string().dimmed()
        );
    }
    println!();
    println!("{} shown", sessions.len());
    Ok(())
}
