//! Status command implementation

use colored::Colorize;
use crumbs_core::{Config, ManifestStore, Session, SessionRecorder};
use serde_json::json;
use tracing::warn;

use crate::error::Result;
use crate::format::{change_counts, format_bytes, outcome_label};

/// Run the status command
pub fn run_status(config: &Config, json: bool) -> Result<()> {
    let store = ManifestStore::new(config.manifest.clone());
    let recorder = SessionRecorder::new(config.sessions.clone());

    if !store.exists() {
        if json {
            let value = json!({
                "manifest": store.path(),
                "exists": false,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", "No manifest yet".yellow().bold());
            println!();
            println!("{}: {}", "Manifest".dimmed(), store.path());
            println!("Run {} to create one.", "crumbs scan <ROOT>".cyan());
        }
        return Ok(());
    }

    let manifest = store.load()?;
    let last = match recorder.latest() {
        Ok(last) => last,
        Err(e) => {
            warn!(error = %e, "Could not read the last session");
            None
        }
    };

    if json {
        let value = json!({
            "manifest": store.path(),
            "exists": true,
            "fileCount": manifest.file_count(),
            "totalSizeBytes": manifest.total_size_bytes(),
            "updatedAt": manifest.updated_at(),
            "lastSession": last.as_ref().map(session_summary),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Manifest Status".bold());
    println!();
    println!("{}:  {}", "Manifest".dimmed(), store.path());
    println!("{}:     {}", "Files".dimmed(), manifest.file_count());
    println!(
        "{}:      {}",
        "Size".dimmed(),
        format_bytes(manifest.total_size_bytes())
    );
    match manifest.updated_at() {
        Some(at) => println!("{}:   {}", "Updated".dimmed(), at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("{}:   {}", "Updated".dimmed(), "never".dimmed()),
    }
    println!();

    println!("{}:", "Last Session".bold());
    match &last {
        Some(session) => {
            let (added, updated, removed) = change_counts(session);
            println!(
                "  {} {} ({})",
                session.started_at.format("%Y-%m-%d %H:%M:%S"),
                outcome_label(session),
                session.root
            );
            println!(
                "  {} added, {} updated, {} removed, {} errors",
                added,
                updated,
                removed,
                session.error_count()
            );
        }
        None => println!("  {} (use {} to record one)", "None".dimmed(), "crumbs scan".cyan()),
    }

    Ok(())
}

fn session_summary(session: &Session) -> serde_json::Value {
    let (added, updated, removed) = change_counts(session);
    json!({
        "id": session.id,
        "root": session.root,
        "startedAt": session.started_at,
        "endedAt": session.ended_at,
        "succeeded": session.succeeded,
        "outcome": session.outcome,
        "added": added,
        "updated": updated,
        "removed": removed,
        "errors": session.error_count(),
    })
}
