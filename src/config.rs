use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use vitalog::remote::DEFAULT_TIMEOUT_SECS;

/// Base URL used when nothing else is configured.
const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL of the backend API
    pub server_url: ConfigValue<String>,
    /// Path to the SQLite cache database
    pub database_path: ConfigValue<PathBuf>,
    /// Path to the persisted session file
    pub session_file: ConfigValue<PathBuf>,
    /// Per-request timeout in seconds
    pub timeout_secs: ConfigValue<u64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    server_url: Option<String>,
    database_path: Option<PathBuf>,
    session_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = Self::default_data_dir();

        // Start with defaults
        let mut server_url =
            ConfigValue::new(DEFAULT_SERVER_URL.to_string(), ConfigSource::Default);
        let mut database_path =
            ConfigValue::new(data_dir.join("vitalog.db"), ConfigSource::Default);
        let mut session_file =
            ConfigValue::new(data_dir.join("session.json"), ConfigSource::Default);
        let mut timeout_secs = ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(url) = file_config.server_url {
                server_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(db_path) = file_config.database_path {
                database_path =
                    ConfigValue::new(resolve_relative(db_path, &path), ConfigSource::File);
            }
            if let Some(session_path) = file_config.session_file {
                session_file =
                    ConfigValue::new(resolve_relative(session_path, &path), ConfigSource::File);
            }
            if let Some(secs) = file_config.timeout_secs {
                timeout_secs = ConfigValue::new(secs, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(url) = std::env::var("VITALOG_SERVER_URL") {
            server_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(db_path) = std::env::var("VITALOG_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(session_path) = std::env::var("VITALOG_SESSION_FILE") {
            session_file = ConfigValue::new(PathBuf::from(session_path), ConfigSource::Environment);
        }
        if let Ok(raw) = std::env::var("VITALOG_TIMEOUT_SECS") {
            let secs = raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VITALOG_TIMEOUT_SECS", raw.clone()))?;
            timeout_secs = ConfigValue::new(secs, ConfigSource::Environment);
        }

        Ok(Self {
            server_url,
            database_path,
            session_file,
            timeout_secs,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/vitalog/
    /// - macOS: ~/Library/Application Support/vitalog/
    /// - Windows: %APPDATA%/vitalog/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vitalog")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/vitalog/
    /// - macOS: ~/Library/Application Support/vitalog/
    /// - Windows: %APPDATA%/vitalog/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vitalog")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Resolve relative paths against the config file's directory
fn resolve_relative(path: PathBuf, config_path: &Path) -> PathBuf {
    if path.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&path))
            .unwrap_or(path)
    } else {
        path
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
