//! Server configuration.
//!
//! Loaded with the following priority:
//! 1. CLI arguments (highest)
//! 2. Config file (`<config_dir>/nexus-server/config.toml`)
//! 3. Built-in defaults (lowest)

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7070;
pub const DEFAULT_MODEL_PATH: &str = "storage/nexus.onnx";
pub const DEFAULT_TOKENIZER_PATH: &str = "storage/tokenizer.model";
pub const DEFAULT_MAX_CONTEXT: usize = 1024;
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_TOP_K: usize = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config read: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Persistent configuration stored in TOML format. Every field is
/// optional so the file can override any subset of the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the ONNX model artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<PathBuf>,

    /// Path to the tokenizer artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenizer: Option<PathBuf>,

    /// Host to bind to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Port to listen on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Maximum context window in tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_context: Option<usize>,

    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Top-k truncation width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl ServerConfig {
    /// Default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nexus-server").join("config.toml"))
    }

    /// Load configuration from the default path, falling back to defaults
    /// when the file is missing or unreadable.
    pub fn load() -> Self {
        Self::default_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Merge with another config, preferring values from `other`.
    pub fn merge(&mut self, other: &ServerConfig) {
        if other.model.is_some() {
            self.model = other.model.clone();
        }
        if other.tokenizer.is_some() {
            self.tokenizer = other.tokenizer.clone();
        }
        if other.host.is_some() {
            self.host = other.host.clone();
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.max_context.is_some() {
            self.max_context = other.max_context;
        }
        if other.temperature.is_some() {
            self.temperature = other.temperature;
        }
        if other.top_k.is_some() {
            self.top_k = other.top_k;
        }
    }

    // Accessors with the built-in defaults applied.

    pub fn model_path(&self) -> PathBuf {
        self.model
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH))
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.tokenizer
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TOKENIZER_PATH))
    }

    pub fn host(&self) -> String {
        self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn max_context(&self) -> usize {
        self.max_context.unwrap_or(DEFAULT_MAX_CONTEXT)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}
