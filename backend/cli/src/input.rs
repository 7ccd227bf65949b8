//! File inputs shared by the subcommands.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tokio::fs;

pub async fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = read_text(path).await?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Read JSON when a path is given.
pub async fn read_json_opt<T: DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>> {
    match path {
        Some(path) => read_json(path).await.map(Some),
        None => Ok(None),
    }
}
