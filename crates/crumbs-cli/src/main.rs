//! crumbs CLI
//!
//! Keeps a manifest of the files under a directory and records every
//! reconciliation run as a session.

mod cli;
mod commands;
mod context;
mod error;
mod format;
mod logging;

use std::path::Path;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use crumbs_core::Config;

use cli::{Cli, Commands};
use commands::ScanOptions;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = context::resolve(&cli.global, &cwd)?;

    logging::init(cli.global.verbose, config.log_file.as_deref())?;
    tracing::debug!(
        manifest = %config.manifest.display(),
        sessions = %config.sessions.display(),
        "Resolved configuration"
    );

    match cli.command {
        Some(cmd) => execute_command(cmd, &config, &cwd),
        None => {
            // No command provided - show help hint
            println!("{} manifest reconciliation", "crumbs".green().bold());
            println!();
            println!("Run {} for available commands.", "crumbs --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, config: &Config, cwd: &Path) -> Result<()> {
    match cmd {
        Commands::Scan {
            root,
            timeout,
            follow_symlinks,
            json,
        } => commands::run_scan(
            config,
            cwd,
            ScanOptions {
                root,
                timeout: timeout.map(Duration::from_secs),
                follow_symlinks,
                json,
            },
        ),
        Commands::Status { json } => commands::run_status(config, json),
        Commands::Sessions { limit, json } => commands::run_sessions(config, limit, json),
    }
}
