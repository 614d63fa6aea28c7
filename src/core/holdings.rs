//! Index holdings, custom stocks and the snapshot wire shape.

use crate::core::format::parse_number;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single index constituent as delivered by the snapshot provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight_pct: f64,
}

impl Holding {
    pub fn new(symbol: &str, name: &str, weight_pct: f64) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            name: name.trim().to_string(),
            weight_pct,
        }
    }
}

/// A user-defined target, in percentage points of the whole portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomStock {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub weight_pct: f64,
}

impl CustomStock {
    /// Normalizes the symbol and falls back to it when no name is given.
    pub fn new(symbol: &str, name: &str, weight_pct: f64) -> Self {
        let symbol = symbol.trim().to_uppercase();
        let name = match name.trim() {
            "" => symbol.clone(),
            n => n.to_string(),
        };
        Self {
            symbol,
            name,
            weight_pct,
        }
    }
}

/// Index holdings snapshot as published by the data provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSnapshot {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub as_of_close: String,
    #[serde(default)]
    pub fetched_at_utc: String,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

impl IndexSnapshot {
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.fetched_at_utc)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Cleans up provider output: uppercase symbols, trimmed names, drops empty symbols and
/// non-positive weights.
pub fn normalize_holdings(snapshot: &IndexSnapshot) -> Vec<Holding> {
    snapshot
        .holdings
        .iter()
        .map(|h| Holding::new(&h.symbol, &h.name, finite_or_zero(h.weight_pct)))
        .filter(|h| !h.symbol.is_empty() && h.weight_pct > 0.0)
        .collect()
}

/// Returns the `n` heaviest holdings, keeping provider order on ties.
pub fn top_n(holdings: &[Holding], n: usize) -> Vec<Holding> {
    let mut sorted = holdings.to_vec();
    sorted.sort_by(|a, b| b.weight_pct.total_cmp(&a.weight_pct));
    sorted.truncate(n);
    sorted
}

pub fn sum_weights_pct(holdings: &[Holding]) -> f64 {
    holdings.iter().map(|h| finite_or_zero(h.weight_pct)).sum()
}

pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

// Weights arrive from hand-edited JSON too; strings and nulls coerce instead of failing.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseNumber::deserialize(deserializer)? {
        LooseNumber::Number(n) => finite_or_zero(n),
        LooseNumber::Text(s) => parse_number(&s),
        LooseNumber::Other(_) => 0.0,
    })
}
