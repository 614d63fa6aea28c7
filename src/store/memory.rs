use crate::core::holdings::CustomStock;
use crate::store::{CustomStockStore, sanitize};
use anyhow::{Result, anyhow};
use std::sync::RwLock;

/// In-memory custom stock list using RwLock
#[derive(Default)]
pub struct MemoryStore {
    stocks: RwLock<Vec<CustomStock>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stocks(stocks: Vec<CustomStock>) -> Self {
        Self {
            stocks: RwLock::new(sanitize(stocks)),
        }
    }
}

impl CustomStockStore for MemoryStore {
    fn load(&self) -> Vec<CustomStock> {
        self.stocks
            .read()
            .map(|stocks| stocks.clone())
            .unwrap_or_default()
    }

    fn save(&self, stocks: &[CustomStock]) -> Result<()> {
        let mut guard = self
            .stocks
            .write()
            .map_err(|_| anyhow!("Custom stock store lock poisoned"))?;
        *guard = stocks.to_vec();
        Ok(())
    }
}
