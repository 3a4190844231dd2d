//! Configuration management for the CLI
//!
//! Configuration is merged from, in increasing precedence:
//! - Default values
//! - A configuration file (JSON, YAML or TOML)
//! - Environment variables
//! - Command-line arguments

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use jsonmap_core::MapperConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Policies handed to every mapper the CLI builds
    pub mapper: MapperConfig,

    /// Logging settings; when absent, verbosity flags decide
    pub logging: Option<LoggingConfig>,
}

/// Document formats accepted for configuration files and manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Ok(FileFormat::Json),
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("toml") => Ok(FileFormat::Toml),
            _ => Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "JSON, YAML or TOML".to_string(),
            }),
        }
    }

    /// Deserialize document text in this format
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        Ok(match self {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
        })
    }
}

/// Read and deserialize a JSON, YAML or TOML document
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Reading configuration");
        read_document(path)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    ///
    /// Environment overrides are applied by the caller once logging is up.
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("jsonmap.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("jsonmap").join("config.toml"));
        }

        paths
    }
}
