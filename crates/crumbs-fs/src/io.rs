//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Tuning for [`write_atomic`].
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// How long to keep retrying the advisory lock and the final rename.
    pub lock_timeout: Duration,
    /// Flush the temp file to stable storage before renaming it.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(10),
            enable_fsync: true,
        }
    }
}

impl RobustnessConfig {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(500),
            max_elapsed_time: Some(self.lock_timeout),
            ..ExponentialBackoff::default()
        }
    }
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a reader (or a crash) only ever sees the
/// previous content or the new content. The temp file lives next to the
/// target to stay on the same filesystem.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let result = write_temp(&temp_path, content, config).and_then(|temp_file| {
        backoff::retry(config.backoff(), || {
            fs::rename(&temp_path, &native_path).map_err(backoff::Error::transient)
        })
        .map_err(|e| Error::io(&native_path, into_io(e)))?;
        // Lock is released when the handle drops, after the rename.
        drop(temp_file);
        Ok(())
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &std::path::Path, content: &[u8], config: RobustnessConfig) -> Result<File> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    backoff::retry(config.backoff(), || {
        FileExt::try_lock_exclusive(&temp_file).map_err(backoff::Error::transient)
    })
    .map_err(|_| Error::LockFailed {
        path: temp_path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if config.enable_fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }

    Ok(temp_file)
}

fn into_io(err: backoff::Error<std::io::Error>) -> std::io::Error {
    match err {
        backoff::Error::Permanent(e) => e,
        backoff::Error::Transient { err, .. } => err,
    }
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::from_read(native_path, e))
}
