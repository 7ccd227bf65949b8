//! `tractstack-config`: engine configuration.
//!
//! Provides:
//! - Typed config schema (site, compile, visibility, logging)
//! - YAML read/write
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, load_raw, write_config};
pub use schema::{CompileConfig, EngineConfig, LoggingConfig, SiteConfig, VisibilityConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load, substitute env vars, apply defaults and validate a config file.
///
/// Validation warnings are logged; validation errors fail the load.
pub async fn load_and_prepare(path: &Path) -> Result<EngineConfig> {
    let raw = load_raw(path).await?;
    let value = resolve_env_vars(&raw).context("Failed to resolve env vars in config")?;
    let config: EngineConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.into_iter().next() {
        bail!(first);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_and_prepare_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "visibility:\n  settleMs: 1000\n").await.unwrap();

        let cfg = load_and_prepare(&path).await.unwrap();
        assert_eq!(cfg.settle_ms(), 1000);
        assert_eq!(cfg.home_slug(), defaults::DEFAULT_HOME_SLUG);
        assert_eq!(cfg.logging.unwrap().level.as_deref(), Some(defaults::DEFAULT_LOG_LEVEL));
    }

    #[tokio::test]
    async fn test_load_and_prepare_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "site:\n  homeSlug: \"has space\"\n").await.unwrap();
        let err = load_and_prepare(&path).await.unwrap_err();
        assert!(err.to_string().contains("site.homeSlug"));
    }
}
