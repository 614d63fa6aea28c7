//! Command handlers and terminal rendering.

pub mod custom;
pub mod holdings;
pub mod parse;
pub mod rebalance;
pub mod setup;
pub mod targets;
pub mod trend;
pub mod ui;

use crate::core::alias::AliasResolver;
use crate::core::config::AppConfig;
use crate::core::holdings::IndexSnapshot;
use crate::core::ocr::TextRecognizer;
use crate::core::portfolio::PortfolioModel;
use crate::core::snapshot::{HistoryProvider, SnapshotProvider};
use crate::store::CustomStockStore;
use anyhow::Result;

/// Everything a command needs, built once from the configuration.
pub struct AppContext {
    pub config: AppConfig,
    pub snapshots: Box<dyn SnapshotProvider>,
    pub history: Option<Box<dyn HistoryProvider>>,
    pub store: Box<dyn CustomStockStore>,
    pub recognizer: Box<dyn TextRecognizer>,
}

impl AppContext {
    pub fn resolver(&self) -> AliasResolver {
        AliasResolver::new(self.config.aliases.clone())
    }

    /// Fetches the latest snapshot and builds the configured portfolio from it.
    pub async fn portfolio(&self) -> Result<(IndexSnapshot, PortfolioModel)> {
        let snapshot = self.snapshots.fetch_snapshot().await?;
        let model = PortfolioModel::from_snapshot(
            &snapshot,
            self.config.top_n,
            self.store.load(),
            self.resolver(),
        );
        Ok((snapshot, model))
    }

    /// `--weights` override, falling back to the configured mode.
    pub fn rescale(&self, override_mode: Option<bool>) -> bool {
        override_mode.unwrap_or(self.config.rescale_top_to_full)
    }
}
