//! Scan command implementation
//!
//! The reconciliation runs on a worker thread. The calling thread renders
//! progress from a channel as indicatif bars and, when a timeout is set,
//! cancels the run through its token once the deadline passes.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use crumbs_core::{
    CancellationToken, Config, Operation, Progress, Reconciler, RunContext, Session,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{info, warn};

use crate::error::{CliError, Result};
use crate::format::{change_counts, outcome_label};

/// Options of `crumbs scan`
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub root: Option<PathBuf>,
    pub timeout: Option<Duration>,
    pub follow_symlinks: bool,
    pub json: bool,
}

/// Run the scan command
pub fn run_scan(config: &Config, cwd: &Path, options: ScanOptions) -> Result<()> {
    let root = match options.root.as_ref().or(config.root.as_ref()) {
        Some(root) => cwd.join(root),
        None => {
            return Err(CliError::user(
                "No root to scan: pass ROOT or set `root` in the configuration",
            ));
        }
    };

    let reconciler = Reconciler::from_config(config)
        .follow_symlinks(config.follow_symlinks || options.follow_symlinks);
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::channel();
    let ctx = RunContext::new()
        .with_cancellation(token.clone())
        .with_progress(tx);

    let worker_root = root.clone();
    let worker = thread::spawn(move || reconciler.run(&worker_root, &ctx));

    // indicatif draws nothing when stderr is not a terminal
    let show_progress = !options.json;
    let timed_out = watch(&rx, &token, options.timeout, show_progress);

    let result = worker
        .join()
        .map_err(|_| CliError::user("Scan worker panicked"))?;

    match result {
        Ok(session) => print_session(&session, options.json),
        Err(crumbs_core::Error::Cancelled) if timed_out => {
            let secs = options.timeout.map_or(0, |t| t.as_secs());
            Err(CliError::user(format!(
                "Scan of {} cancelled after {secs}s timeout",
                root.display()
            )))
        }
        Err(e) => Err(e.into()),
    }
}

/// Drain progress until the worker hangs up. Returns whether the deadline
/// fired.
fn watch(
    rx: &Receiver<Progress>,
    token: &CancellationToken,
    timeout: Option<Duration>,
    render: bool,
) -> bool {
    let mut bars = PassBars::new(render);
    let mut deadline = timeout.map(|t| Instant::now() + t);
    let mut timed_out = false;

    loop {
        if let Some(at) = deadline
            && Instant::now() >= at
        {
            warn!(timeout_secs = timeout.map_or(0, |t| t.as_secs()), "Scan timed out, cancelling");
            token.cancel();
            timed_out = true;
            deadline = None;
        }

        let next = match deadline {
            Some(at) => rx.recv_timeout(at.saturating_duration_since(Instant::now())),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match next {
            Ok(progress) => bars.update(progress),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    bars.finish(timed_out);
    timed_out
}

/// One progress bar per pass on stderr, drawn only when `visible`.
struct PassBars {
    visible: bool,
    current: Option<(Operation, ProgressBar)>,
}

impl PassBars {
    fn new(visible: bool) -> Self {
        Self {
            visible,
            current: None,
        }
    }

    fn update(&mut self, progress: Progress) {
        if self
            .current
            .as_ref()
            .is_none_or(|(operation, _)| *operation != progress.operation)
        {
            if let Some((_, done)) = self.current.take() {
                done.finish();
            }
            self.current = Some((progress.operation, self.bar(progress.operation)));
        }

        if let Some((_, bar)) = &self.current {
            bar.set_length(progress.total as u64);
            bar.set_position(progress.processed as u64);
        }
    }

    fn bar(&self, operation: Operation) -> ProgressBar {
        let target = if self.visible {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(None, target);
        if let Ok(style) = ProgressStyle::with_template("{msg:.dim} [{bar:30}] {pos}/{len}") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message(operation.name());
        bar
    }

    fn finish(&mut self, timed_out: bool) {
        match self.current.take() {
            Some((_, bar)) if timed_out => bar.abandon_with_message("timed out"),
            Some((_, bar)) => bar.finish(),
            None => {}
        }
    }
}

fn print_session(session: &Session, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(session)?);
        return Ok(());
    }

    let (added, updated, removed) = change_counts(session);
    info!(added, updated, removed, errors = session.error_count(), "Scan summary");

    println!("{} {}", "Scan".bold(), outcome_label(session));
    println!();
    println!("{}:     {}", "Root".dimmed(), session.root);
    println!("{}:    {}", "Added".dimmed(), added.to_string().green());
    println!("{}:  {}", "Updated".dimmed(), updated.to_string().cyan());
    println!("{}:  {}", "Removed".dimmed(), removed.to_string().red());
    println!("{}:  {}", "Session".dimmed(), session.id);

    let errors: Vec<_> = [
        session.removed.as_ref().map(|r| &r.errors),
        session.updated.as_ref().map(|r| &r.errors),
        session.added.as_ref().map(|r| &r.errors),
    ]
    .into_iter()
    .flatten()
    .flatten()
    .collect();
    if !errors.is_empty() {
        println!();
        println!("{} ({}):", "Unreadable files".yellow().bold(), errors.len());
        for error in errors {
            println!("  {} {}: {}", "!".yellow(), error.path, error.message);
        }
    }
    Ok(())
}
