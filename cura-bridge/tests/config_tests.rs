//! Configuration resolution tests
//!
//! Note: tests that manipulate CURA_BRIDGE_* environment variables are
//! marked with #[serial] to prevent ENV race conditions between parallel
//! tests.

use cura_bridge::config::{
    BridgeConfig, ConfigOverrides, TomlConfig, DEFAULT_ANALYSIS_URL, DEFAULT_ASSET_STORE_URL,
    ENV_ANALYSIS_URL, ENV_ASSET_STORE_URL, ENV_FOLDERS,
};
use cura_bridge::error::BridgeError;
use serial_test::serial;
use std::time::Duration;

fn clear_env() {
    std::env::remove_var(ENV_ASSET_STORE_URL);
    std::env::remove_var(ENV_ANALYSIS_URL);
    std::env::remove_var(ENV_FOLDERS);
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();
    let config = BridgeConfig::resolve(ConfigOverrides::default(), &TomlConfig::default());
    assert_eq!(config.asset_store_url, DEFAULT_ASSET_STORE_URL);
    assert_eq!(config.analysis_url, DEFAULT_ANALYSIS_URL);
    assert!(config.folders.is_none());
    assert_eq!(config.analysis_timeout, Duration::from_secs(120));
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    std::env::set_var(ENV_ANALYSIS_URL, "http://from-env:9000/process");

    let toml = TomlConfig {
        analysis_url: Some("http://from-toml:9000/process".to_string()),
        ..Default::default()
    };
    let config = BridgeConfig::resolve(ConfigOverrides::default(), &toml);
    assert_eq!(config.analysis_url, "http://from-env:9000/process");

    clear_env();
}

#[test]
#[serial]
fn test_cli_override_beats_env() {
    clear_env();
    std::env::set_var(ENV_ASSET_STORE_URL, "http://from-env:41595/api");

    let overrides = ConfigOverrides {
        asset_store_url: Some("http://from-cli:41595/api".to_string()),
        ..Default::default()
    };
    let config = BridgeConfig::resolve(overrides, &TomlConfig::default());
    assert_eq!(config.asset_store_url, "http://from-cli:41595/api");

    clear_env();
}

#[test]
#[serial]
fn test_blank_env_value_is_ignored() {
    clear_env();
    std::env::set_var(ENV_FOLDERS, "   ");

    let config = BridgeConfig::resolve(ConfigOverrides::default(), &TomlConfig::default());
    assert!(config.folders.is_none());

    clear_env();
}

#[test]
#[serial]
fn test_env_folders_applied() {
    clear_env();
    std::env::set_var(ENV_FOLDERS, "F1,F2");

    let config = BridgeConfig::resolve(ConfigOverrides::default(), &TomlConfig::default());
    assert_eq!(config.folders.as_deref(), Some("F1,F2"));

    clear_env();
}

#[test]
fn test_load_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        analysis_url = "http://analysis.local:9000/process"
        analysis_timeout_secs = 300
        "#,
    )
    .unwrap();

    let toml = TomlConfig::load(&path).unwrap();
    assert_eq!(
        toml.analysis_url.as_deref(),
        Some("http://analysis.local:9000/process")
    );
    assert_eq!(toml.analysis_timeout_secs, Some(300));
}

#[test]
fn test_load_invalid_toml_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "analysis_url = [not toml").unwrap();

    let result = TomlConfig::load(&path);
    assert!(matches!(result, Err(BridgeError::Config(_))));
}

#[test]
fn test_load_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = TomlConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(BridgeError::Config(_))));
}
