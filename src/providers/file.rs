use crate::core::holdings::IndexSnapshot;
use crate::core::snapshot::{HistoryProvider, SnapshotProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Reading {}", path.display());
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Snapshot read from a local JSON file, for offline use.
pub struct FileSnapshotProvider {
    path: PathBuf,
}

impl FileSnapshotProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSnapshotProvider { path: path.into() }
    }
}

#[async_trait]
impl SnapshotProvider for FileSnapshotProvider {
    async fn fetch_snapshot(&self) -> Result<IndexSnapshot> {
        read_json(&self.path).await
    }
}

/// History laid out as `<dir>/index.json` plus `<dir>/<date>.json`.
pub struct FileHistoryProvider {
    dir: PathBuf,
}

impl FileHistoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileHistoryProvider { dir: dir.into() }
    }
}

#[async_trait]
impl HistoryProvider for FileHistoryProvider {
    async fn load_index(&self) -> Result<Vec<String>> {
        read_json(&self.dir.join("index.json")).await
    }

    async fn load_snapshot(&self, date: &str) -> Result<IndexSnapshot> {
        read_json(&self.dir.join(format!("{date}.json"))).await
    }
}
