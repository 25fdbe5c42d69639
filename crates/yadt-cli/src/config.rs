//! Configuration file support
//!
//! ```toml
//! color = "auto"
//! channel_capacity = 64
//! fail_fast = false
//!
//! [diff]
//! sections = ["spec", "status"]
//!
//! [diff.filter]
//! ignore_status = true
//!
//! [diff.render]
//! show_timestamp = true
//! change_style = "combined"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use yadt_core::errors::{ExError, YadtError};
use yadt_core::DiffOptions;
use yadt_engine::DEFAULT_CHANNEL_CAPACITY;

/// When to emit ANSI colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stdout is a terminal and `NO_COLOR` is unset
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        }
    }
}

/// Contents of a configuration file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub diff: DiffOptions,
    pub color: ColorChoice,
    pub channel_capacity: usize,
    pub fail_fast: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            diff: DiffOptions::default(),
            color: ColorChoice::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            fail_fast: false,
        }
    }
}

impl Config {
    /// Parse TOML text
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on syntax errors, unknown keys or bad values.
    pub fn from_toml(text: &str) -> Result<Self, ExError> {
        let config: Config = toml::from_str(text).map_err(|e| {
            ExError::from(YadtError::InvalidConfig {
                reason: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    fn validate(&self) -> Result<(), ExError> {
        let reason = if self.channel_capacity == 0 {
            Some("channel_capacity must be at least 1")
        } else if self.diff.sections.is_empty() {
            Some("diff.sections must name at least one section")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(YadtError::InvalidConfig {
                reason: reason.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}
