//! A portfolio configuration: the ranked index slice, custom stocks and the alias groups that
//! apply to both.

use crate::core::alias::AliasResolver;
use crate::core::holdings::{CustomStock, Holding, IndexSnapshot, normalize_holdings, top_n};
use crate::core::targets::{TargetSet, build_targets};
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct PortfolioModel {
    pub holdings: Vec<Holding>,
    pub custom: Vec<CustomStock>,
    pub resolver: AliasResolver,
}

impl PortfolioModel {
    /// Normalizes the snapshot, merges alias members and keeps the `top_n` heaviest entries.
    pub fn from_snapshot(
        snapshot: &IndexSnapshot,
        top: usize,
        custom: Vec<CustomStock>,
        resolver: AliasResolver,
    ) -> Self {
        let merged = resolver.merge_holdings(&normalize_holdings(snapshot));
        Self {
            holdings: top_n(&merged, top),
            custom,
            resolver,
        }
    }

    pub fn targets(&self, rescale_top_to_full: bool) -> TargetSet {
        build_targets(&self.holdings, rescale_top_to_full, &self.custom)
    }

    /// Symbols the user can enter values for, index slice first, without duplicates.
    pub fn tracked_symbols(&self) -> Vec<(String, String)> {
        let mut seen = BTreeSet::new();
        self.holdings
            .iter()
            .map(|h| (h.symbol.clone(), h.name.clone()))
            .chain(
                self.custom
                    .iter()
                    .map(|c| (c.symbol.clone(), c.name.clone())),
            )
            .filter(|(symbol, _)| seen.insert(symbol.clone()))
            .collect()
    }

    pub fn allowed_symbols(&self) -> BTreeSet<String> {
        self.tracked_symbols().into_iter().map(|(s, _)| s).collect()
    }

    /// Canonical symbol for user input, honoring alias groups present in this portfolio.
    pub fn canonical_symbol(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_uppercase();
        self.resolver
            .active_for(&self.allowed_symbols())
            .resolve(&symbol)
            .to_string()
    }
}
