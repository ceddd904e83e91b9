//! quadvm configuration
//!
//! # Configuration hierarchy
//!
//! ```text
//! Priority (high -> low):
//! 1. CLI arguments
//! 2. Explicit config file (--config PATH)
//! 3. Project-level (./quadvm.toml)
//! 4. Default values
//! ```
//!
//! # Example
//!
//! ```toml
//! [pipeline]
//! optimize = true
//!
//! [optimizer]
//! fixed_point = false
//!
//! [vm]
//! max_steps = 100000
//! trace_execution = false
//!
//! [log]
//! level = "info"
//! ```

use crate::middle::optimizer::OptimizerConfig;
use crate::util::logger::LogLevel;
use crate::vm::VMConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file name
pub const CONFIG_FILE_NAME: &str = "quadvm.toml";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Phase selection
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Optimizer settings
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    /// VM settings
    #[serde(default)]
    pub vm: VMConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run the optimizer between lowering and execution
    #[serde(default = "default_optimize")]
    pub optimize: bool,
}

fn default_optimize() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { optimize: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub level: LogLevel,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Config serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load configuration from a file
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml(&content)
}

/// Load configuration.
///
/// An explicit path must exist. Without one, `quadvm.toml` in `dir` is used
/// when present, defaults otherwise.
pub fn load_config(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let project = dir.join(CONFIG_FILE_NAME);
    if project.exists() {
        load_config_file(&project)
    } else {
        Ok(Config::default())
    }
}
