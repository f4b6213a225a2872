//! Configuration file loading with environment variable overrides.
//!
//! A [`Config`] is assembled once at startup and never mutated afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default Stability AI structure-control endpoint.
pub const DEFAULT_UPSTREAM_ENDPOINT: &str =
    "https://api.stability.ai/v2beta/stable-image/control/structure";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream API settings.
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// API key configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeysConfig {
    /// Stability AI API key.
    pub stability: Option<String>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Deployment label reported by `/health`.
    pub environment: String,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            environment: "development".to_string(),
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

/// Upstream API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Structure-control endpoint URL.
    pub endpoint: String,
    /// Upper bound on a single upstream call, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { endpoint: DEFAULT_UPSTREAM_ENDPOINT.to_string(), timeout_secs: 120 }
    }
}

impl UpstreamConfig {
    /// The call bound as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Apply `STABILITY_API_KEY`, `ENVIRONMENT` and `PORT` overrides.
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("STABILITY_API_KEY") {
            self.keys.stability = Some(key);
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.server.environment = environment;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port =
                port.trim().parse().map_err(|e| format!("Invalid PORT value '{port}': {e}"))?;
        }
        Ok(self)
    }

    /// The Stability API key, if one is configured and non-empty.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.keys.stability.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Whether upstream calls can be authenticated.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `RENOVISION_CONFIG` environment variable
/// 3. `~/.config/renovision/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("RENOVISION_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/renovision/config.toml")
    } else {
        PathBuf::from("renovision.toml")
    }
}
