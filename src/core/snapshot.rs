//! Index snapshot abstractions

use crate::core::holdings::IndexSnapshot;
use anyhow::Result;
use async_trait::async_trait;

/// Delivers the latest index holdings snapshot.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<IndexSnapshot>;
}

/// Delivers dated historical snapshots.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Available snapshot dates (`YYYY-MM-DD`), ascending.
    async fn load_index(&self) -> Result<Vec<String>>;

    async fn load_snapshot(&self, date: &str) -> Result<IndexSnapshot>;
}
