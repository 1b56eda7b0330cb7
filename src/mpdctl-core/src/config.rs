use crate::paths::AppDirs;
use crate::tags::TagSelection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default window used by advanced queue searches that ask for "no limit".
/// Matches the daemon's default `max_playlist_length`.
pub const DEFAULT_SEARCH_WINDOW_MAX: u32 = 16384;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    #[serde(default)]
    pub mpd: MpdConfig,
    #[serde(default)]
    pub tags: TagConfig,
    #[serde(default)]
    pub webserver: WebserverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            mpd: MpdConfig::default(),
            tags: TagConfig::default(),
            webserver: WebserverConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpdConfig {
    #[serde(default = "default_partition")]
    pub partition: String,
    #[serde(default)]
    pub music_directory: DirectorySetting,
    #[serde(default)]
    pub playlist_directory: DirectorySetting,
    #[serde(default = "default_search_window_max")]
    pub search_window_max: u32,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            partition: default_partition(),
            music_directory: DirectorySetting::Auto,
            playlist_directory: DirectorySetting::Auto,
            search_window_max: default_search_window_max(),
        }
    }
}

/// Tag lists requested by the client, each narrowed against what the daemon
/// supports during negotiation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagConfig {
    /// Master list; every other list is narrowed against its result.
    #[serde(default)]
    pub enabled: TagSelection,
    #[serde(default)]
    pub search: TagSelection,
    #[serde(default)]
    pub browse: TagSelection,
    #[serde(default)]
    pub smart_playlist: TagSelection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebserverConfig {
    #[serde(default = "default_webserver_host")]
    pub host: String,
    #[serde(default = "default_webserver_port")]
    pub port: u16,
}

impl Default for WebserverConfig {
    fn default() -> Self {
        Self {
            host: default_webserver_host(),
            port: default_webserver_port(),
        }
    }
}

/// Where a directory value comes from.
///
/// Unrecognised strings are preserved as [`DirectorySetting::Invalid`] so the
/// problem is reported when the directory is resolved instead of failing the
/// whole config load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DirectorySetting {
    /// Ask the daemon (only possible over a local socket).
    #[default]
    Auto,
    /// Feature disabled.
    None,
    /// Absolute path used verbatim.
    Path(PathBuf),
    Invalid(String),
}

impl From<String> for DirectorySetting {
    fn from(value: String) -> Self {
        match value.as_str() {
            "auto" => DirectorySetting::Auto,
            "none" => DirectorySetting::None,
            path if path.starts_with('/') => DirectorySetting::Path(PathBuf::from(path)),
            _ => DirectorySetting::Invalid(value),
        }
    }
}

impl From<&str> for DirectorySetting {
    fn from(value: &str) -> Self {
        DirectorySetting::from(value.to_string())
    }
}

impl From<DirectorySetting> for String {
    fn from(value: DirectorySetting) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DirectorySetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectorySetting::Auto => f.write_str("auto"),
            DirectorySetting::None => f.write_str("none"),
            DirectorySetting::Path(path) => write!(f, "{}", path.display()),
            DirectorySetting::Invalid(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    #[serde(default = "default_stdout_enabled")]
    pub stdout: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            stdout: default_stdout_enabled(),
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("mpd.partition must not be empty")]
    EmptyPartition,
    #[error("mpd.search_window_max must be greater than zero")]
    ZeroSearchWindow,
}

impl Config {
    pub fn load_or_default(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = Self::config_path(dirs);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn config_path(dirs: &AppDirs) -> PathBuf {
        dirs.config_dir().join("config.toml")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        if self.mpd.partition.trim().is_empty() {
            return Err(ValidationError::EmptyPartition);
        }
        if self.mpd.search_window_max == 0 {
            return Err(ValidationError::ZeroSearchWindow);
        }
        Ok(())
    }
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_partition() -> String {
    "default".into()
}

fn default_search_window_max() -> u32 {
    DEFAULT_SEARCH_WINDOW_MAX
}

fn default_webserver_host() -> String {
    "localhost".into()
}

fn default_webserver_port() -> u16 {
    8080
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

fn default_stdout_enabled() -> bool {
    true
}
