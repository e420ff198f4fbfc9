//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// crumbs - keep a manifest of the files under a directory
#[derive(Parser, Debug)]
#[command(name = "crumbs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "CRUMBS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Manifest file, overriding the configuration
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Session directory, overriding the configuration
    #[arg(long, global = true)]
    pub sessions: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile the manifest with the files under ROOT
    ///
    /// Examples:
    ///   crumbs scan /data              # Scan a directory
    ///   crumbs scan --timeout 600      # Scan the configured root, give up after 10 minutes
    Scan {
        /// Directory to scan; defaults to `root` from the configuration
        root: Option<PathBuf>,

        /// Cancel the scan after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Follow symbolic links while walking
        #[arg(long)]
        follow_symlinks: bool,

        /// Print the session as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show the manifest summary and the last session
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List recorded sessions, most recent first
    Sessions {
        /// Number of sessions to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
