//! Error types for crumbs-core

use std::path::PathBuf;

/// Result type for crumbs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a manifest
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root path is blank or is not an existing directory
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A manifest or session file that must exist is missing
    #[error("Not found: {path}")]
    NotFound { path: PathBuf },

    /// A single file could not be stat'ed or hashed
    #[error("Unreadable file {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// The caller asked the run to stop
    #[error("Reconciliation cancelled")]
    Cancelled,

    /// Persisting the manifest or a session failed
    #[error("Store failure at {path}: {source}")]
    StoreFailure {
        path: PathBuf,
        #[source]
        source: crumbs_fs::Error,
    },

    /// The configuration file could not be loaded
    #[error("Configuration error at {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: crumbs_fs::Error,
    },
}

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wrap a persistence failure at `path`, keeping a missing file distinct.
    pub fn store(path: impl Into<PathBuf>, source: crumbs_fs::Error) -> Self {
        match source {
            crumbs_fs::Error::NotFound { path } => Self::NotFound { path },
            source => Self::StoreFailure {
                path: path.into(),
                source,
            },
        }
    }

    /// Short machine-readable name of the error kind, as written to sessions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid-input",
            Self::NotFound { .. } => "not-found",
            Self::Unreadable { .. } => "unreadable",
            Self::Cancelled => "cancelled",
            Self::StoreFailure { .. } => "store-failure",
            Self::Config { .. } => "config",
        }
    }

    /// Per-file errors are accumulated into a pass report instead of aborting
    /// the run.
    pub fn is_per_file(&self) -> bool {
        matches!(self, Self::Unreadable { .. })
    }
}

impl From<crumbs_fs::Error> for Error {
    fn from(source: crumbs_fs::Error) -> Self {
        match source {
            crumbs_fs::Error::Unreadable { path, reason } => Self::Unreadable { path, reason },
            crumbs_fs::Error::NotFound { path } => Self::NotFound { path },
            crumbs_fs::Error::Io { path, source } => Self::Unreadable {
                path,
                reason: source.to_string(),
            },
            other => Self::StoreFailure {
                path: PathBuf::new(),
                source: other,
            },
        }
    }
}
