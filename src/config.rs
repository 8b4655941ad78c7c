//! Configuration for the extension logger
//!
//! Two sources: environment flags that decide verbosity and which sinks exist,
//! and an optional TOML file with names and limits.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::host::DEFAULT_PANEL_CAPACITY;
use crate::logging::rotation::{DEFAULT_MAX_FILES, DEFAULT_MAX_SIZE};
use crate::logging::{FileOptions, Level};

/// Continuous-integration indicator
pub const CI_VAR: &str = "CI";
/// Explicit extension-debug indicator
pub const EXT_DEBUG_VAR: &str = "EXT_DEBUG";
/// Local test-run indicator
pub const LOCAL_TEST_VAR: &str = "LOCAL_TEST";

/// Default log file name inside the extension directory
pub const DEFAULT_FILE_NAME: &str = "typescript-hero.log";
/// Default output panel title
pub const DEFAULT_CHANNEL_NAME: &str = "TypeScript Hero";

/// Process environment flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvFlags {
    pub ci: bool,
    pub ext_debug: bool,
    pub local_test: bool,
}

impl EnvFlags {
    /// Read the flags from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the flags through a lookup function. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |name: &str| lookup(name).is_some_and(|v| !v.is_empty());
        Self {
            ci: flag(CI_VAR),
            ext_debug: flag(EXT_DEBUG_VAR),
            local_test: flag(LOCAL_TEST_VAR),
        }
    }

    /// Running inside an interactive editor session (no CI, debug or test flag)
    pub fn is_interactive(&self) -> bool {
        !self.ci && !self.ext_debug && !self.local_test
    }

    /// Logger threshold for a requested verbosity
    pub fn effective_level(&self, verbosity: Level) -> Level {
        if self.ci {
            Level::Error
        } else {
            verbosity
        }
    }

    /// Console sink threshold
    pub fn console_level(&self) -> Level {
        if self.ci || self.local_test {
            Level::Error
        } else {
            Level::Debug
        }
    }

    /// File sink threshold: info or debug pass through, anything stricter becomes info
    pub fn file_level(&self, effective: Level) -> Level {
        match effective {
            Level::Info | Level::Debug => effective,
            Level::Error | Level::Warn => Level::Info,
        }
    }
}

/// Logger settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Requested verbosity
    #[serde(default = "default_verbosity")]
    pub verbosity: Level,

    /// Title of the editor output panel
    #[serde(default = "default_channel_name")]
    pub channel_name: String,

    /// Log file name inside the extension directory
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Size in bytes at which the log file rotates (default: 1 MiB)
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Backup generations kept next to the log file (default: 1)
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Lines kept by in-memory output panels
    #[serde(default = "default_panel_capacity")]
    pub panel_capacity: usize,
}

fn default_verbosity() -> Level {
    Level::Info
}

fn default_channel_name() -> String {
    DEFAULT_CHANNEL_NAME.to_string()
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_max_size() -> u64 {
    DEFAULT_MAX_SIZE
}

fn default_max_files() -> usize {
    DEFAULT_MAX_FILES
}

fn default_panel_capacity() -> usize {
    DEFAULT_PANEL_CAPACITY
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            verbosity: default_verbosity(),
            channel_name: default_channel_name(),
            file_name: default_file_name(),
            max_size: default_max_size(),
            max_files: default_max_files(),
            panel_capacity: default_panel_capacity(),
        }
    }
}

impl LoggerConfig {
    /// Load configuration from file, or return defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read logger config")?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse logger config")
    }

    /// Serialize configuration to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize logger config")
    }

    /// Size cap and backups for the file sink
    pub fn file_options(&self) -> FileOptions {
        FileOptions {
            max_size: self.max_size,
            max_files: self.max_files,
        }
    }
}
