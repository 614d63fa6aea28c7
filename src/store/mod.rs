//! Persistence for user-defined custom stocks.

pub mod disk;
pub mod memory;

use crate::core::holdings::CustomStock;
use anyhow::{Result, bail};

pub use disk::DiskStore;
pub use memory::MemoryStore;

/// Storage for the custom stock list. Loading never fails: unreadable entries are skipped.
pub trait CustomStockStore: Send + Sync {
    fn load(&self) -> Vec<CustomStock>;
    fn save(&self, stocks: &[CustomStock]) -> Result<()>;
}

/// Drops entries that could not have been added through `add_or_update`.
pub fn sanitize(stocks: Vec<CustomStock>) -> Vec<CustomStock> {
    stocks
        .into_iter()
        .map(|s| CustomStock::new(&s.symbol, &s.name, s.weight_pct))
        .filter(|s| !s.symbol.is_empty() && s.weight_pct.is_finite() && s.weight_pct > 0.0)
        .collect()
}

/// Inserts or replaces `stock` by symbol; the list stays sorted by weight, heaviest first.
pub fn add_or_update(stocks: &[CustomStock], stock: CustomStock) -> Result<Vec<CustomStock>> {
    let stock = CustomStock::new(&stock.symbol, &stock.name, stock.weight_pct);
    if stock.symbol.is_empty() {
        bail!("Symbol must not be empty");
    }
    if !stock.weight_pct.is_finite() || stock.weight_pct <= 0.0 {
        bail!("Weight for {} must be greater than 0", stock.symbol);
    }

    let mut updated: Vec<CustomStock> = stocks
        .iter()
        .filter(|s| s.symbol != stock.symbol)
        .cloned()
        .collect();
    updated.push(stock);
    updated.sort_by(|a, b| b.weight_pct.total_cmp(&a.weight_pct));
    Ok(updated)
}

pub fn remove(stocks: &[CustomStock], symbol: &str) -> Vec<CustomStock> {
    let symbol = symbol.trim().to_uppercase();
    stocks
        .iter()
        .filter(|s| s.symbol != symbol)
        .cloned()
        .collect()
}
