//! Rebalancing engine: reconciles targets with current holdings into a buy/sell plan.

use crate::core::targets::Target;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Current dollar value per symbol.
pub type CurrentValues = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRow {
    pub symbol: String,
    pub name: String,
    pub target_pct: f64,
    pub current: f64,
    pub target_value: f64,
    /// `target_value - current`; positive buys, negative sells.
    pub delta: f64,
    /// Cash assigned under the additional-investment policy.
    pub suggested_buy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl PlanRow {
    pub fn action(&self) -> Action {
        match self.suggested_buy {
            Some(buy) if buy > 0.0 => Action::Buy,
            Some(_) => Action::Hold,
            None if self.delta > 0.0 => Action::Buy,
            None if self.delta < 0.0 => Action::Sell,
            None => Action::Hold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalancePlan {
    pub current_total: f64,
    pub new_total: f64,
    pub additional: Option<f64>,
    pub rows: Vec<PlanRow>,
}

impl RebalancePlan {
    pub fn total_suggested_buy(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.suggested_buy).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    /// Full rebalance to an explicit portfolio total; produces buys and sells.
    NewTotal(f64),
    /// Invest extra cash into underweight symbols only.
    Additional(f64),
}

/// Merges targets that share a symbol, summing their percentages. The first name wins.
pub fn consolidate_targets(targets: &[Target]) -> Vec<Target> {
    let mut out: Vec<Target> = Vec::with_capacity(targets.len());
    let mut index: HashMap<&str, usize> = HashMap::new();

    for t in targets {
        match index.get(t.symbol.as_str()) {
            Some(&i) => out[i].target_pct += t.target_pct,
            None => {
                index.insert(t.symbol.as_str(), out.len());
                out.push(t.clone());
            }
        }
    }
    out
}

/// Adds a zero-percent target for every current holding that has no target, so a full
/// rebalance can recommend liquidating it.
pub fn extend_targets(targets: &[Target], current: &CurrentValues) -> Vec<Target> {
    let mut extended = targets.to_vec();
    for symbol in current.keys() {
        if !targets.iter().any(|t| &t.symbol == symbol) {
            debug!(%symbol, "Extending targets with untracked holding");
            extended.push(Target {
                symbol: symbol.clone(),
                name: symbol.clone(),
                target_pct: 0.0,
            });
        }
    }
    extended
}

pub fn current_total(current: &CurrentValues) -> f64 {
    current.values().filter(|v| v.is_finite()).sum()
}

fn desired_rows(targets: &[Target], current: &CurrentValues, new_total: f64) -> Vec<PlanRow> {
    targets
        .iter()
        .map(|t| {
            let held = current
                .get(&t.symbol)
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0);
            let target_value = t.target_pct / 100.0 * new_total;
            PlanRow {
                symbol: t.symbol.clone(),
                name: t.name.clone(),
                target_pct: t.target_pct,
                current: held,
                target_value,
                delta: target_value - held,
                suggested_buy: None,
            }
        })
        .collect()
}

/// Full rebalance of `targets` to `new_total`. Rows are ordered by the size of the move.
///
/// Current holdings without a target only count towards `current_total`; run
/// [`extend_targets`] first (or use [`plan`]) to get rows for them.
pub fn rebalance_to_new_total(
    targets: &[Target],
    current: &CurrentValues,
    new_total: f64,
) -> RebalancePlan {
    let mut rows = desired_rows(targets, current, new_total);
    rows.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));

    RebalancePlan {
        current_total: current_total(current),
        new_total,
        additional: None,
        rows,
    }
}

/// Distributes `additional` cash over underweight targets, pro rata to how far below target
/// each one is. Nothing is sold; if no target is underweight the cash stays unallocated.
pub fn rebalance_with_additional_investment(
    targets: &[Target],
    current: &CurrentValues,
    additional: f64,
) -> RebalancePlan {
    let current_total = current_total(current);
    let new_total = current_total + additional;

    let mut rows = desired_rows(targets, current, new_total);
    let total_buy_need: f64 = rows.iter().map(|r| r.delta).filter(|d| *d > 0.0).sum();

    for row in &mut rows {
        let buy = if row.delta > 0.0 && total_buy_need > 0.0 {
            row.delta / total_buy_need * additional
        } else {
            0.0
        };
        row.suggested_buy = Some(buy);
    }
    rows.sort_by(|a, b| {
        b.suggested_buy
            .unwrap_or(0.0)
            .total_cmp(&a.suggested_buy.unwrap_or(0.0))
    });

    debug!(
        current_total,
        new_total, additional, total_buy_need, "Allocated additional investment"
    );

    RebalancePlan {
        current_total,
        new_total,
        additional: Some(additional),
        rows,
    }
}

/// Consolidates duplicate targets, extends them with untracked holdings and applies `policy`.
///
/// Every symbol of `current` ends up in exactly one row.
pub fn plan(targets: &[Target], current: &CurrentValues, policy: Policy) -> RebalancePlan {
    let prepared = extend_targets(&consolidate_targets(targets), current);
    match policy {
        Policy::NewTotal(new_total) => rebalance_to_new_total(&prepared, current, new_total),
        Policy::Additional(additional) => {
            rebalance_with_additional_investment(&prepared, current, additional)
        }
    }
}
