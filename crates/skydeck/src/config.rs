//! Console configuration.
//!
//! Settings are read from `config.toml` in the platform config directory
//! (e.g. `~/.config/skydeck/config.toml` on Linux), then overridden by
//! environment variables. A missing file means defaults.
//!
//! ```toml
//! api_base_url = "https://api.skydeck.example"
//! request_timeout_secs = 30
//! log_filter = "info,skydeck::cascade=debug"
//! max_visible_notifications = 5
//! ```
//!
//! | Variable | Field |
//! |---|---|
//! | `SKYDECK_API_BASE_URL` | `api_base_url` |
//! | `SKYDECK_TOKEN_PATH` | `token_path` |
//! | `SKYDECK_LOG` | `log_filter` |

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use skydeck_core::logging::{self, targets};

use crate::notifications::DEFAULT_MAX_VISIBLE;

/// File name of the config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Overrides `api_base_url`.
pub const ENV_API_BASE_URL: &str = "SKYDECK_API_BASE_URL";
/// Overrides `token_path`.
pub const ENV_TOKEN_PATH: &str = "SKYDECK_TOKEN_PATH";
/// Overrides `log_filter`.
pub const ENV_LOG: &str = "SKYDECK_LOG";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `api_base_url` is not an absolute URL.
    #[error("Invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A field holds an unusable value.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl ConfigError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration of a console instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Backend base URL; request paths are appended to it.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Token file location; the platform data directory when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
    /// `tracing` filter directives.
    pub log_filter: String,
    /// Bound on visible toasts.
    pub max_visible_notifications: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_path: None,
            log_filter: logging::DEFAULT_FILTER.to_string(),
            max_visible_notifications: DEFAULT_MAX_VISIBLE,
        }
    }
}

impl ConsoleConfig {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "skydeck", "skydeck")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, apply process environment overrides
    /// and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: targets::CONFIG, path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::io(path, e)),
        };
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(target: targets::CONFIG, path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_BASE_URL) {
            tracing::debug!(target: targets::CONFIG, "api_base_url overridden by {ENV_API_BASE_URL}");
            self.api_base_url = url;
        }
        if let Some(path) = get(ENV_TOKEN_PATH) {
            self.token_path = Some(PathBuf::from(path));
        }
        if let Some(filter) = get(ENV_LOG) {
            self.log_filter = filter;
        }
    }

    /// Check field values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.api_base_url).map_err(|source| {
            ConfigError::InvalidBaseUrl {
                url: self.api_base_url.clone(),
                source,
            }
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_visible_notifications == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_visible_notifications",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Write to `path` atomically (temporary file and rename).
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let toml_str = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let tmp = path.with_extension("toml.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(toml_str.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, path)
        };
        write().map_err(|e| ConfigError::io(path, e))
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Token file location, falling back to the platform data directory.
    pub fn resolved_token_path(&self) -> Option<PathBuf> {
        self.token_path
            .clone()
            .or_else(skydeck_net::auth::default_token_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "api_base_url = \"https://api.example.com\"\n").unwrap();

        let config = ConsoleConfig::load_from(&path).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_visible_notifications, DEFAULT_MAX_VISIBLE);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = ConsoleConfig {
            api_base_url: "https://console.example.com".into(),
            request_timeout_secs: 10,
            token_path: Some(dir.path().join("token.json")),
            log_filter: "debug".into(),
            max_visible_notifications: 3,
        };
        config.save_to(&path).unwrap();
        assert_eq!(ConsoleConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();
        let err = ConsoleConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_BASE_URL, "https://staging.example.com"),
            (ENV_TOKEN_PATH, "/tmp/skydeck-token.json"),
            (ENV_LOG, ""),
        ]
        .into();

        let mut config = ConsoleConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api_base_url, "https://staging.example.com");
        assert_eq!(
            config.resolved_token_path(),
            Some(PathBuf::from("/tmp/skydeck-token.json"))
        );
        // Blank values do not override.
        assert_eq!(config.log_filter, logging::DEFAULT_FILTER);
    }

    #[test]
    fn test_validate() {
        let mut config = ConsoleConfig {
            api_base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        config.api_base_url = "ftp://example.com".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field: "api_base_url", .. })
        ));

        config.api_base_url = DEFAULT_BASE_URL.into();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
