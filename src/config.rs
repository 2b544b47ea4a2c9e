//! Layered settings: built-in defaults, then an optional TOML file, then CLI flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use tally_logs::{DEFAULT_DEBOUNCE_MS, DEFAULT_SUFFIX};

/// Default input loop tick in milliseconds
const DEFAULT_TICK_MS: u64 = 250;

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Suffix identifying log files in a directory root
    pub suffix: String,

    /// Watcher debounce window
    pub debounce_ms: u64,

    /// Input loop tick rate
    pub tick_ms: u64,

    /// Initial state of the time column
    pub show_timestamps: bool,

    /// Initial state of the source column
    pub show_sources: bool,

    /// Where diagnostics are written while the terminal is in use
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            tick_ms: DEFAULT_TICK_MS,
            show_timestamps: true,
            show_sources: true,
            log_file: None,
        }
    }
}

impl Settings {
    /// `$XDG_CONFIG_HOME/tally/config.toml` (or the platform equivalent)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tally").join("config.toml"))
    }

    /// `$XDG_STATE_HOME/tally/tally.log`, or under the cache directory when the
    /// platform has no state directory
    pub fn default_log_path() -> Option<PathBuf> {
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|dir| dir.join("tally").join("tally.log"))
    }

    /// Load settings from `explicit`, or from the default location if a file
    /// exists there. An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply command-line flags on top of file and default values
    pub fn with_overrides(mut self, suffix: Option<String>, log_file: Option<PathBuf>) -> Self {
        if let Some(suffix) = suffix {
            self.suffix = suffix;
        }
        if log_file.is_some() {
            self.log_file = log_file;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.suffix.is_empty() {
            bail!("suffix must not be empty");
        }
        if self.tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }
        Ok(())
    }
}
