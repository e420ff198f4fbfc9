//! Effective configuration for one invocation
//!
//! The config file is found the usual way (see [`Config::discover`]); the
//! path flags given on the command line then win over whatever it says.
//! Relative flag values are taken relative to the working directory.

use std::path::Path;

use crumbs_core::Config;

use crate::cli::GlobalArgs;
use crate::error::Result;

/// Resolve the configuration for this invocation.
pub fn resolve(global: &GlobalArgs, cwd: &Path) -> Result<Config> {
    let mut config = Config::discover(global.config.as_deref(), cwd)?;

    if let Some(manifest) = &global.manifest {
        config.manifest = cwd.join(manifest);
    }
    if let Some(sessions) = &global.sessions {
        config.sessions = cwd.join(sessions);
    }
    if let Some(log_file) = &global.log_file {
        config.log_file = Some(cwd.join(log_file));
    }
    Ok(config)
}
