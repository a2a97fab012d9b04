use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::parser::ParseMode;

/// Environment variable overriding the output home directory.
pub const HOME_ENV: &str = "CSLOG_HOME";

/// Directory name of the simulator home, relative to the user's home.
pub const DEFAULT_HOME_DIR: &str = ".sinalgo";

/// Configuration for a merge run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Base directory; merged files are written under `<home>/logs/`.
    pub home: PathBuf,
    /// Treatment of consensus lines missing required fields.
    pub parse_mode: ParseMode,
    /// Compute summary lines without appending them.
    pub dry_run: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            home: default_home(),
            parse_mode: ParseMode::default(),
            dry_run: false,
        }
    }
}

impl MergeConfig {
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// `$CSLOG_HOME`, else `$HOME/.sinalgo`, else `.sinalgo`.
pub fn default_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => PathBuf::from(home).join(DEFAULT_HOME_DIR),
        None => PathBuf::from(DEFAULT_HOME_DIR),
    }
}
