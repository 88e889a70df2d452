//! # Client Configuration
//!
//! Configuration for the backend client, the search box and the session file.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOREFRONT_ENDPOINT=http://localhost:8082/api/v1                   │
//! │     STOREFRONT_DEBOUNCE_MS=300                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/storefront/client.toml (Linux)                           │
//! │     ~/Library/Application Support/com.storefront.shell/client.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local backend, 500 ms debounce                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [backend]
//! endpoint = "http://localhost:8082/api/v1"
//! request_timeout_secs = 30
//!
//! [search]
//! debounce_ms = 500
//! max_query_len = 100
//!
//! [session]
//! path = "/home/shopper/.local/share/storefront/session.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Backend Settings
// =============================================================================

/// Where the REST backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL; endpoint paths such as `/products` are appended to it.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8082/api/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

// =============================================================================
// Search Settings
// =============================================================================

/// Search box behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a search is sent.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_max_query_len")]
    pub max_query_len: usize,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_max_query_len() -> usize {
    storefront_core::validation::MAX_SEARCH_QUERY_LEN
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            debounce_ms: default_debounce_ms(),
            max_query_len: default_max_query_len(),
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session file location. Falls back to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::resolve_path(config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file and returns the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<PathBuf> {
        let path = Self::resolve_path(config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml()?)?;

        info!(?path, "Client config saved");
        Ok(path)
    }

    /// The configuration as `client.toml` contents.
    pub fn to_toml(&self) -> ClientResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The explicit path if given, else the platform default.
    pub fn resolve_path(config_path: Option<PathBuf>) -> Option<PathBuf> {
        config_path.or_else(Self::default_config_path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.backend.endpoint)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "Backend endpoint must start with http:// or https://, got: {}",
                self.backend.endpoint
            )));
        }

        if self.backend.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.search.max_query_len == 0 {
            return Err(ClientError::InvalidConfig(
                "max_query_len must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("STOREFRONT_ENDPOINT") {
            debug!(endpoint = %endpoint, "Overriding backend endpoint from environment");
            self.backend.endpoint = endpoint;
        }

        if let Some(secs) = Self::numeric_env("STOREFRONT_REQUEST_TIMEOUT_SECS") {
            debug!(request_timeout_secs = secs, "Overriding request timeout from environment");
            self.backend.request_timeout_secs = secs;
        }

        if let Some(ms) = Self::numeric_env("STOREFRONT_DEBOUNCE_MS") {
            debug!(debounce_ms = ms, "Overriding search debounce from environment");
            self.search.debounce_ms = ms;
        }

        if let Ok(path) = std::env::var("STOREFRONT_SESSION_PATH") {
            self.session.path = Some(PathBuf::from(path));
        }
    }

    /// Reads a numeric override. A value that does not parse is ignored
    /// with a warning.
    fn numeric_env(name: &str) -> Option<u64> {
        let value = std::env::var(name).ok()?;
        match value.trim().parse::<u64>() {
            Ok(n) => Some(n),
            Err(_) => {
                warn!(var = name, value = %value, "Ignoring non-numeric environment override");
                None
            }
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "storefront", "shell")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("client.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn endpoint(&self) -> &str {
        self.backend.endpoint.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// The session file: the configured path, or `session.json` in the
    /// platform data directory.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session
            .path
            .clone()
            .or_else(|| Self::project_dirs().map(|dirs| dirs.data_dir().join("session.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.search.debounce_ms, 500);
        assert_eq!(config.debounce(), Duration::from_millis(500));
        assert_eq!(config.search.max_query_len, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.backend.endpoint = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.backend.endpoint = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.backend.endpoint = "https://qkart.example.com/api/v1".to_string();
        assert!(config.validate().is_ok());

        config.backend.request_timeout_secs = 0;
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let mut config = ClientConfig::default();
        config.backend.endpoint = "http://localhost:8082/api/v1/".to_string();
        assert_eq!(config.endpoint(), "http://localhost:8082/api/v1");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [search]
            debounce_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.search.max_query_len, 100);
        assert_eq!(config.backend.endpoint, default_endpoint());
        assert!(config.session.path.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let mut config = ClientConfig::default();
        config.backend.endpoint = "https://shop.example.com/api/v1".to_string();
        let written = config.save(Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[backend]"));
        assert!(contents.contains("[search]"));
        assert_eq!(contents, config.to_toml().unwrap());

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.backend.endpoint, "https://shop.example.com/api/v1");
    }

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let explicit = PathBuf::from("/tmp/storefront/client.toml");
        assert_eq!(
            ClientConfig::resolve_path(Some(explicit.clone())),
            Some(explicit)
        );
        assert_eq!(
            ClientConfig::resolve_path(None),
            ClientConfig::default_config_path()
        );
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("STOREFRONT_ENDPOINT", "https://env.example.com/api/v1");
        std::env::set_var("STOREFRONT_DEBOUNCE_MS", "250");
        std::env::set_var("STOREFRONT_REQUEST_TIMEOUT_SECS", "soon");

        let mut config = ClientConfig::default();
        config.apply_env_overrides();

        // Swap which numeric override is malformed; both are skipped alike.
        std::env::set_var("STOREFRONT_DEBOUNCE_MS", "fast");
        std::env::set_var("STOREFRONT_REQUEST_TIMEOUT_SECS", " 45 ");
        let mut swapped = ClientConfig::default();
        swapped.apply_env_overrides();

        std::env::remove_var("STOREFRONT_ENDPOINT");
        std::env::remove_var("STOREFRONT_DEBOUNCE_MS");
        std::env::remove_var("STOREFRONT_REQUEST_TIMEOUT_SECS");

        assert_eq!(config.backend.endpoint, "https://env.example.com/api/v1");
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.backend.request_timeout_secs, 30);

        assert_eq!(swapped.search.debounce_ms, 500);
        assert_eq!(swapped.backend.request_timeout_secs, 45);
    }

    #[test]
    fn test_configured_session_path_wins() {
        let mut config = ClientConfig::default();
        config.session.path = Some(PathBuf::from("/tmp/custom-session.json"));
        assert_eq!(
            config.session_path(),
            Some(PathBuf::from("/tmp/custom-session.json"))
        );
    }
}
