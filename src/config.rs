//! Configuration management for linguist-catalog
//!
//! Handles loading configuration from a JSON file. Every field has a default,
//! so a missing file or a partial file is valid.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "io.github.linguist-catalog";

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Maximum source file size scanned during extraction (in bytes) - 10MB
pub const MAX_SOURCE_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum directory depth scanned during extraction
pub const DEFAULT_SCAN_DEPTH: usize = 16;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Runtime lookup configuration
    pub lookup: LookupConfig,

    /// Source extraction configuration
    pub extract: ExtractConfig,

    /// Catalog writing configuration
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = Self::config_dir()?.join(CONFIG_FILE_NAME);
                if !default.exists() {
                    log::debug!("No configuration at {}, using defaults", default.display());
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, json)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.output.ts_version.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "output.ts_version".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.extract.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "extract.max_file_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Lookup behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Serve non-empty translations still marked unfinished
    pub include_unfinished: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            include_unfinished: true,
        }
    }
}

/// Source extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// C++ file extensions scanned for `tr()` calls
    pub source_extensions: Vec<String>,

    /// Designer form extensions
    pub form_extensions: Vec<String>,

    /// Directories to ignore when scanning
    pub ignored_directories: Vec<String>,

    /// Maximum directory depth to scan
    pub max_depth: usize,

    /// Skip files larger than this (in bytes)
    pub max_file_size: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            source_extensions: ["cpp", "cc", "cxx", "h", "hpp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            form_extensions: vec!["ui".to_string()],
            ignored_directories: vec![
                ".git".to_string(),
                "build".to_string(),
                "target".to_string(),
                "node_modules".to_string(),
                "translations".to_string(),
            ],
            max_depth: DEFAULT_SCAN_DEPTH,
            max_file_size: MAX_SOURCE_FILE_SIZE,
        }
    }
}

/// Catalog writing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format version written to new catalogs
    pub ts_version: String,

    /// Order contexts by name after an update
    pub sort_contexts: bool,

    /// Keep messages that disappeared from the sources as vanished
    pub keep_obsolete: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            ts_version: crate::catalog::DEFAULT_TS_VERSION.to_string(),
            sort_contexts: true,
            keep_obsolete: true,
        }
    }
}
