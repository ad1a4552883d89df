//! # Configuration
//!
//! Settings read from `campusmap.toml`, with environment overrides.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! cors_origins = ["https://maps.example.edu"]
//!
//! [snap]
//! vertex_threshold = 8.0
//! grid_enabled = true
//! grid_size = 10.0
//!
//! [routing]
//! walking_speed = 1.4
//!
//! [log]
//! format = "json"
//! ```
//!
//! Every section and key is optional. Environment variables win over the file:
//! - `CAMPUSMAP_LOG_FORMAT`: `text` or `json`
//! - `CAMPUSMAP_CORS_ORIGINS`: comma-separated origins, or `*` for all

use campusmap_core::primitives::DEFAULT_WALKING_SPEED;
use campusmap_core::{CampusError, SnapConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "campusmap.toml";

/// Default request body limit (2 MB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub snap: SnapConfig,
    pub routing: RoutingConfig,
    pub log: LogConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means localhost only.
    pub cors_origins: Vec<String>,
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

/// Route finder defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Metres per second, used for edges without an estimated time.
    pub walking_speed: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            walking_speed: DEFAULT_WALKING_SPEED,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CampusError> {
        toml::from_str(text).map_err(|e| CampusError::ConfigError(e.to_string()))
    }

    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one
    /// is an error.
    pub fn load(path: &Path) -> Result<Self, CampusError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| {
            CampusError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `CAMPUSMAP_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("CAMPUSMAP_LOG_FORMAT") {
            if let Some(format) = LogFormat::parse(&value) {
                self.log.format = format;
            }
        }
        if let Ok(value) = std::env::var("CAMPUSMAP_CORS_ORIGINS") {
            self.server.cors_origins = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch `CAMPUSMAP_*` variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml_str("").expect("parse"), Config::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9000

            [snap]
            grid_enabled = true
            "#,
        )
        .expect("parse");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.snap.grid_enabled);
        assert_eq!(config.snap.vertex_threshold, SnapConfig::default().vertex_threshold);
        assert_eq!(config.routing, RoutingConfig::default());
    }

    #[test]
    fn json_log_format() {
        let config = Config::from_toml_str("[log]\nformat = \"json\"\n").expect("parse");
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn malformed_is_config_error() {
        let err = Config::from_toml_str("[server\nport = ").expect_err("malformed");
        assert_eq!(err.code(), "ConfigError");

        let err = Config::from_toml_str("[server]\nport = \"eighty\"\n").expect_err("bad type");
        assert_eq!(err.code(), "ConfigError");
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[routing]\nwalking_speed = 0.9\n").expect("write");

        let config = Config::load(&path).expect("load");
        assert!((config.routing.walking_speed - 0.9).abs() < 1e-12);
    }

    #[test]
    fn env_overrides_file() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: Tests touching CAMPUSMAP_* run sequentially under ENV_MUTEX.
        unsafe {
            std::env::set_var("CAMPUSMAP_LOG_FORMAT", "JSON");
            std::env::set_var("CAMPUSMAP_CORS_ORIGINS", "https://a.test, ,https://b.test");
        }

        let config = Config::default().with_env_overrides();

        // SAFETY: Tests touching CAMPUSMAP_* run sequentially under ENV_MUTEX.
        unsafe {
            std::env::remove_var("CAMPUSMAP_LOG_FORMAT");
            std::env::remove_var("CAMPUSMAP_CORS_ORIGINS");
        }

        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.server.cors_origins, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn unknown_log_format_ignored() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        // SAFETY: Tests touching CAMPUSMAP_* run sequentially under ENV_MUTEX.
        unsafe { std::env::set_var("CAMPUSMAP_LOG_FORMAT", "yaml") };

        let config = Config::default().with_env_overrides();

        // SAFETY: Tests touching CAMPUSMAP_* run sequentially under ENV_MUTEX.
        unsafe { std::env::remove_var("CAMPUSMAP_LOG_FORMAT") };

        assert_eq!(config.log.format, LogFormat::Text);
    }
}
