//! Tracing subscriber setup
//!
//! Console output goes to stderr, filtered by `RUST_LOG` (default `warn`,
//! `debug` with `--verbose`). With a log file configured, a second layer
//! appends plain-text records to it at `info` (or `debug`).

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{CliError, Result};

pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let console_level = if verbose { "debug" } else { "warn" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_level));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_filter(console_filter);

    let file = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let handle = OpenOptions::new().create(true).append(true).open(path)?;
            let file_level = if verbose { "debug" } else { "info" };
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(handle))
                    .with_filter(EnvFilter::new(file_level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| CliError::user(format!("Failed to initialise logging: {e}")))?;

    tracing::debug!("Logging initialised");
    Ok(())
}
