//! Filesystem layer for crumbs
//!
//! Provides the I/O collaborators of the reconciliation engine: normalized
//! paths with case-insensitive keys, atomic document storage, SHA-256
//! fingerprints and recursive directory walking.

pub mod checksum;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod io;
pub mod path;
pub mod walk;

pub use config::{ConfigStore, Format};
pub use error::{Error, Result};
pub use fingerprint::{Fingerprint, Signature};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, PathKey};
pub use walk::Walker;
