//! CLI command implementations for mipsim.

pub(crate) mod run;
pub(crate) mod shell;

use clap::ValueEnum;
use mipsim::{ConfigError, LoadError, SimConfig, SimError};
use std::error::Error;
use std::fmt;
use std::path::Path;

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable register dump.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Human-readable log lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        Self::new(e.to_string())
    }
}

/// Load the config file if given, then apply the `--max-cycles` override.
pub(crate) fn load_config(
    path: Option<&Path>,
    max_cycles: Option<u64>,
) -> Result<SimConfig, CliError> {
    let mut config = match path {
        Some(path) => SimConfig::from_file(path)
            .map_err(|e| CliError::new(format!("{}: {e}", path.display())))?,
        None => SimConfig::default(),
    };
    if max_cycles.is_some() {
        config.max_cycles = max_cycles;
    }
    config.validate()?;
    Ok(config)
}
