use clap::ValueEnum;
use screenwright_export::PageGeometry;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_NAME: &str = "screenwright.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Screenwright configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Quiet period before an edit is written to the store
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Directory holding one JSON record per project
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Owner recorded on projects created from this directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Layout directives plus page geometry, for an external renderer
    Json,
    /// Paginated fixed-pitch text
    Text,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    #[serde(default = "default_export_format")]
    pub format: ExportFormat,

    #[serde(rename = "outDir", skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,

    #[serde(default)]
    pub page: PageGeometry,
}

fn default_debounce_ms() -> u64 {
    1500
}

fn default_store_dir() -> String {
    ".screenwright/projects".to_string()
}

fn default_export_format() -> ExportFormat {
    ExportFormat::Text
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> Result<Self, ConfigError> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);
        let path = config_path.display().to_string();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            let config: Config =
                serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Get absolute path to the project store
    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            store_dir: default_store_dir(),
            owner: None,
            export: ExportConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_export_format(),
            out_dir: None,
            page: PageGeometry::default(),
        }
    }
}
