use crate::path::SearchPath;
use log::LevelFilter;
use std::ffi::OsString;
use std::path::PathBuf;

/// Prompt printed before every line.
pub const PROMPT: &str = "$ ";

/// Settings captured from the environment at startup.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub search_path: SearchPath,
    /// File that log records are written to; logging is off when `None`.
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl ShellConfig {
    pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

    /// Reads `PATH`, `RSH_LOG` and `RSH_LOG_LEVEL` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let log_level = lookup("RSH_LOG_LEVEL")
            .and_then(|level| level.to_str()?.trim().parse().ok())
            .unwrap_or(Self::DEFAULT_LOG_LEVEL);

        Self {
            search_path: SearchPath::new(lookup("PATH")),
            log_file: lookup("RSH_LOG")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            log_level,
        }
    }
}
