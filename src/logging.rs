use crate::config::ShellConfig;
use anyhow::Context;
use simplelog::{Config, WriteLogger};
use std::fs::OpenOptions;

/// Installs a file logger when `RSH_LOG` names a file.
///
/// The terminal belongs to the shell, so records never go to stdout or stderr.
/// Returns `Ok(false)` when no logger was requested.
pub fn init(config: &ShellConfig) -> anyhow::Result<bool> {
    let Some(path) = &config.log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    WriteLogger::init(config.log_level, Config::default(), file)?;
    Ok(true)
}
