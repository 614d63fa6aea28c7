use crate::core::holdings::CustomStock;
use crate::store::{CustomStockStore, sanitize};
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PARTITION: &str = "custom_stocks";

/// Custom stocks kept in a fjall keyspace, keyed by symbol with a JSON value.
pub struct DiskStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskStore {
    pub fn open(data_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_path)
            .with_context(|| format!("Failed to create data directory: {}", data_path.display()))?;

        let keyspace = fjall::Config::new(data_path.join("store"))
            .open()
            .context("Failed to open custom stock store")?;
        let partition = keyspace
            .open_partition(PARTITION, PartitionCreateOptions::default())
            .context("Failed to open custom stock partition")?;
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

impl CustomStockStore for DiskStore {
    fn load(&self) -> Vec<CustomStock> {
        let mut stocks = Vec::new();
        for item in self.partition.iter() {
            let (key, value) = match item {
                Ok(kv) => kv,
                Err(e) => {
                    debug!("DiskStore read error: {}", e);
                    continue;
                }
            };
            match serde_json::from_slice::<CustomStock>(&value) {
                Ok(stock) => stocks.push(stock),
                Err(e) => debug!(
                    "Skipping malformed entry {}: {}",
                    String::from_utf8_lossy(&key),
                    e
                ),
            }
        }

        let mut stocks = sanitize(stocks);
        stocks.sort_by(|a, b| b.weight_pct.total_cmp(&a.weight_pct));
        stocks
    }

    fn save(&self, stocks: &[CustomStock]) -> Result<()> {
        let stale: Vec<_> = self
            .partition
            .keys()
            .filter_map(|k| k.ok())
            .filter(|k| !stocks.iter().any(|s| s.symbol.as_bytes() == &k[..]))
            .collect();
        for key in stale {
            self.partition.remove(key)?;
        }

        for stock in stocks {
            self.partition
                .insert(stock.symbol.as_bytes(), serde_json::to_vec(stock)?)?;
        }
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist custom stocks")?;
        debug!("Saved {} custom stocks", stocks.len());
        Ok(())
    }
}
