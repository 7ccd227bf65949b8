//! Config file location, reading and writing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::schema::EngineConfig;

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the config directory.
/// Priority: `TRACTSTACK_CONFIG_DIR` env > `~/.tractstack/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TRACTSTACK_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".tractstack"),
        None => PathBuf::from(".tractstack"),
    }
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read and parse YAML as a raw value tree, before substitution.
///
/// A missing file reads as an empty mapping.
pub async fn load_raw(path: &Path) -> Result<serde_json::Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(serde_json::Value::Object(Default::default()));
    }
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value: serde_json::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;
    // An empty file parses as null.
    Ok(if value.is_null() { serde_json::Value::Object(Default::default()) } else { value })
}

/// Load the config without substitution or defaults.
pub async fn load_config(path: &Path) -> Result<EngineConfig> {
    let value = load_raw(path).await?;
    let config = serde_json::from_value(value)
        .with_context(|| format!("Config at {} has unexpected shape", path.display()))?;
    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write the config atomically: temp file, then rename.
pub async fn write_config(config: &EngineConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    let tmp = path.with_extension("yaml.tmp");
    fs::write(&tmp, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;
    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SiteConfig;

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(&dir.path().join("nope.yaml")).await.unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[tokio::test]
    async fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "").await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), EngineConfig::default());
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(&dir.path().join("nested"));
        let mut cfg = EngineConfig::default();
        cfg.site = Some(SiteConfig { home_slug: Some("welcome".into()) });
        write_config(&cfg, &path).await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), cfg);
    }

    #[tokio::test]
    async fn test_bad_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "site: [unclosed").await.unwrap();
        assert!(load_config(&path).await.is_err());
    }
}
