//! Configuration resolution for the bridge
//!
//! Per-field priority: explicit override (CLI) → environment variable →
//! TOML config file → compiled default. Both services are local processes,
//! so the defaults point at localhost and most runs need no configuration
//! at all.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default asset store API base URL (local application)
pub const DEFAULT_ASSET_STORE_URL: &str = "http://localhost:41595/api";
/// Default analysis service process endpoint
pub const DEFAULT_ANALYSIS_URL: &str = "http://localhost:8000/process";
/// Timeout for the one call that transmits a file
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 120;
/// Items fetched per page
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// Pause between page fetches
pub const DEFAULT_PAGE_DELAY_MS: u64 = 500;

/// Environment variable overriding the asset store URL
pub const ENV_ASSET_STORE_URL: &str = "CURA_BRIDGE_ASSET_STORE_URL";
/// Environment variable overriding the analysis service URL
pub const ENV_ANALYSIS_URL: &str = "CURA_BRIDGE_ANALYSIS_URL";
/// Environment variable setting the folder filter
pub const ENV_FOLDERS: &str = "CURA_BRIDGE_FOLDERS";

/// Optional TOML config file contents
///
/// Default location: `~/.config/cura-bridge/config.toml`. Every field is
/// optional; anything unset falls through to the compiled default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Asset store API base URL
    pub asset_store_url: Option<String>,
    /// Analysis service process endpoint
    pub analysis_url: Option<String>,
    /// Comma-separated folder ids restricting the item listing
    pub folders: Option<String>,
    /// Per-call timeout for asset store requests (unset = unconstrained)
    pub asset_store_timeout_secs: Option<u64>,
    /// Per-call timeout for analysis requests
    pub analysis_timeout_secs: Option<u64>,
    /// Pause between page fetches
    pub page_delay_ms: Option<u64>,
}

impl TomlConfig {
    /// Load from an explicit path; unreadable or invalid files are errors
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| BridgeError::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load from the default location, falling back to empty config when the
    /// file is missing or invalid (a bad config file must not block a run)
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    /// Default config file path for the platform
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cura-bridge").join("config.toml"))
    }
}

/// Explicit per-field overrides, highest priority (CLI flags)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub asset_store_url: Option<String>,
    pub analysis_url: Option<String>,
    pub folders: Option<String>,
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Asset store API base URL
    pub asset_store_url: String,
    /// Analysis service process endpoint
    pub analysis_url: String,
    /// Optional folder filter for item listing
    pub folders: Option<String>,
    /// Per-call timeout for asset store requests (None = unconstrained)
    pub asset_store_timeout: Option<Duration>,
    /// Per-call timeout for analysis requests (transmits the file)
    pub analysis_timeout: Duration,
    /// Page size for item listing
    pub batch_size: usize,
    /// Pause between page fetches
    pub page_delay: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            asset_store_url: DEFAULT_ASSET_STORE_URL.to_string(),
            analysis_url: DEFAULT_ANALYSIS_URL.to_string(),
            folders: None,
            asset_store_timeout: None,
            analysis_timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
        }
    }
}

impl BridgeConfig {
    /// Merge overrides over environment over TOML over defaults
    pub fn resolve(overrides: ConfigOverrides, toml: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            asset_store_url: overrides
                .asset_store_url
                .or_else(|| env_override(ENV_ASSET_STORE_URL))
                .or_else(|| toml.asset_store_url.clone())
                .unwrap_or(defaults.asset_store_url),
            analysis_url: overrides
                .analysis_url
                .or_else(|| env_override(ENV_ANALYSIS_URL))
                .or_else(|| toml.analysis_url.clone())
                .unwrap_or(defaults.analysis_url),
            folders: overrides
                .folders
                .or_else(|| env_override(ENV_FOLDERS))
                .or_else(|| toml.folders.clone()),
            asset_store_timeout: toml.asset_store_timeout_secs.map(Duration::from_secs),
            analysis_timeout: toml
                .analysis_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.analysis_timeout),
            batch_size: defaults.batch_size,
            page_delay: toml
                .page_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.page_delay),
        }
    }
}

/// Environment value, ignoring unset or blank variables
fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.asset_store_url, "http://localhost:41595/api");
        assert_eq!(config.analysis_url, "http://localhost:8000/process");
        assert!(config.folders.is_none());
        assert!(config.asset_store_timeout.is_none());
        assert_eq!(config.analysis_timeout, Duration::from_secs(120));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.page_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_toml_parsing_all_fields() {
        let config: TomlConfig = toml::from_str(
            r#"
            asset_store_url = "http://localhost:41595/api"
            analysis_url = "http://analysis.local:9000/process"
            folders = "F1,F2"
            asset_store_timeout_secs = 30
            analysis_timeout_secs = 240
            page_delay_ms = 100
            "#,
        )
        .unwrap();

        assert_eq!(
            config.analysis_url.as_deref(),
            Some("http://analysis.local:9000/process")
        );
        assert_eq!(config.folders.as_deref(), Some("F1,F2"));
        assert_eq!(config.asset_store_timeout_secs, Some(30));
        assert_eq!(config.analysis_timeout_secs, Some(240));
        assert_eq!(config.page_delay_ms, Some(100));
    }

    #[test]
    fn test_toml_parsing_empty() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.asset_store_url.is_none());
        assert!(config.analysis_timeout_secs.is_none());
    }

    #[test]
    fn test_override_beats_toml() {
        let toml = TomlConfig {
            analysis_url: Some("http://from-toml:9000/process".to_string()),
            ..Default::default()
        };
        let overrides = ConfigOverrides {
            analysis_url: Some("http://from-cli:9001/process".to_string()),
            ..Default::default()
        };
        let config = BridgeConfig::resolve(overrides, &toml);
        assert_eq!(config.analysis_url, "http://from-cli:9001/process");
    }

    #[test]
    fn test_toml_beats_default() {
        let toml = TomlConfig {
            asset_store_timeout_secs: Some(15),
            page_delay_ms: Some(50),
            ..Default::default()
        };
        let config = BridgeConfig::resolve(ConfigOverrides::default(), &toml);
        assert_eq!(config.asset_store_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.page_delay, Duration::from_millis(50));
        assert_eq!(config.asset_store_url, DEFAULT_ASSET_STORE_URL);
    }
}
