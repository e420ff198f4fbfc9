//! Persistence of session records

use std::fs;

use chrono::{DateTime, Utc};
use crumbs_fs::{ConfigStore, NormalizedPath};
use tracing::debug;

use super::Session;
use crate::{Error, Result};

const EXTENSION: &str = "json";
const SEQUENCE_MARK: char = '~';

/// Writes one file per session into a directory.
///
/// File names are the session's start time (`20240102T030405.678Z.json`).
/// Existing files are never replaced: a name collision gets a sequence number
/// (`20240102T030405.678Z~1.json`), and listing orders by stem then sequence,
/// so the order is the order of writing.
#[derive(Debug, Clone)]
pub struct SessionRecorder {
    dir: NormalizedPath,
    documents: ConfigStore,
}

impl SessionRecorder {
    pub fn new(dir: impl Into<NormalizedPath>) -> Self {
        Self {
            dir: dir.into(),
            documents: ConfigStore::new(),
        }
    }

    /// Directory holding the session files
    pub fn dir(&self) -> &NormalizedPath {
        &self.dir
    }

    /// Persist `session`, returning the file it was written to.
    pub fn finalize(&self, session: &Session) -> Result<NormalizedPath> {
        let stem = file_stem(session.started_at);
        let mut path = self.dir.join(&format!("{stem}.{EXTENSION}"));
        let mut sequence = 0u32;
        while path.exists() {
            sequence += 1;
            path = self.dir.join(&format!("{stem}{SEQUENCE_MARK}{sequence}.{EXTENSION}"));
        }

        self.documents
            .save(&path, session)
            .map_err(|e| Error::store(path.to_native(), e))?;
        debug!(path = %path, id = %session.id, "Recorded session");
        Ok(path)
    }

    /// Session files in chronological order. A missing directory has none.
    pub fn list(&self) -> Result<Vec<NormalizedPath>> {
        let entries = match fs::read_dir(self.dir.to_native()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::store(
                    self.dir.to_native(),
                    crumbs_fs::Error::io(self.dir.to_native(), e),
                ));
            }
        };

        let mut sessions: Vec<NormalizedPath> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .map(|entry| NormalizedPath::new(entry.path()))
            .filter(|path| path.extension() == Some(EXTENSION))
            .collect();
        sessions.sort_by_cached_key(|path| write_order(path));
        Ok(sessions)
    }

    /// Read a session file back.
    pub fn load(&self, path: &NormalizedPath) -> Result<Session> {
        self.documents
            .load(path)
            .map_err(|e| Error::store(path.to_native(), e))
    }

    /// The most recent session, if any was recorded.
    pub fn latest(&self) -> Result<Option<Session>> {
        match self.list()?.last() {
            Some(path) => self.load(path).map(Some),
            None => Ok(None),
        }
    }
}

/// Sortable, millisecond-precision file stem for a session start time.
pub(crate) fn file_stem(started_at: DateTime<Utc>) -> String {
    started_at.format("%Y%m%dT%H%M%S%.3fZ").to_string()
}

/// Sort key of a session file: its stem, then its collision sequence.
fn write_order(path: &NormalizedPath) -> (String, u32) {
    let name = path.file_name().unwrap_or_default();
    let name = name
        .strip_suffix(EXTENSION)
        .and_then(|n| n.strip_suffix('.'))
        .unwrap_or(name);
    match name.rsplit_once(SEQUENCE_MARK) {
        Some((stem, sequence)) => match sequence.parse() {
            Ok(sequence) => (stem.to_string(), sequence),
            Err(_) => (name.to_string(), 0),
        },
        None => (name.to_string(), 0),
    }
}
