//! Configuration for a crumbs installation
//!
//! A config file names where the manifest and the session files live and,
//! optionally, where to log and which root to scan by default. It may be
//! TOML, JSON or YAML; the format follows the file extension.

use std::path::{Path, PathBuf};

use crumbs_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "crumbs.toml";

const APP_DIR: &str = "crumbs";

/// Resolved configuration
///
/// Missing keys take their defaults. The `FileList`, `SessionFolder` and
/// `LogFile` spellings are accepted as aliases so existing config files keep
/// working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Manifest file
    #[serde(alias = "FileList")]
    pub manifest: PathBuf,

    /// Directory receiving one file per session
    #[serde(alias = "SessionFolder")]
    pub sessions: PathBuf,

    /// Append logs to this file in addition to stderr
    #[serde(alias = "LogFile", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Root scanned when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        let base = data_dir();
        Self {
            manifest: base.join("manifest.json"),
            sessions: base.join("sessions"),
            log_file: None,
            root: None,
            follow_symlinks: false,
        }
    }
}

impl Config {
    /// Load a config file. Relative paths inside it are resolved against the
    /// directory containing the file.
    ///
    /// A blank `root` is rejected with [`Error::InvalidInput`] instead of
    /// resolving to the file's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Config = ConfigStore::new()
            .load(&NormalizedPath::new(path))
            .map_err(|source| Error::Config {
                path: path.to_path_buf(),
                source,
            })?;

        if config.root.as_ref().is_some_and(|root| is_blank(root)) {
            return Err(Error::invalid_input(format!(
                "Root path cannot be blank (in {})",
                path.display()
            )));
        }
        if let Some(base) = path.parent() {
            config.resolve_relative(base);
        }
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Find and load the effective configuration.
    ///
    /// Lookup order: `explicit` (which must exist), then [`LOCAL_CONFIG_FILE`]
    /// in `cwd`, then the per-user file from [`Config::default_location`].
    /// With none of them present the defaults are used.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = cwd.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load(&local);
        }

        if let Some(user) = Self::default_location().filter(|p| p.is_file()) {
            return Self::load(&user);
        }

        debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Per-user config file, `<config dir>/crumbs/config.toml`
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    fn resolve_relative(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.manifest);
        resolve(&mut self.sessions);
        if let Some(log_file) = self.log_file.as_mut() {
            resolve(log_file);
        }
        if let Some(root) = self.root.as_mut() {
            resolve(root);
        }
    }
}

pub(crate) fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
