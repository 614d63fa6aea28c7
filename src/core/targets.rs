//! Target-weight builder: index holdings plus custom stocks normalized to a 100% basis.

use crate::core::holdings::{CustomStock, Holding, finite_or_zero, sum_weights_pct};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    pub symbol: String,
    pub name: String,
    pub target_pct: f64,
}

/// Intermediate sums of a build, kept for display and audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetMeta {
    /// Summed weight of the supplied index holdings.
    pub top_sum: f64,
    /// Share of the portfolio the index slice stands for (100 when rescaled).
    pub index_portion_pct: f64,
    pub custom_sum: f64,
    pub total_target_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetSet {
    pub meta: TargetMeta,
    pub targets: Vec<Target>,
}

/// Dollar split of an investment amount across targets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub symbol: String,
    pub name: String,
    pub target_pct: f64,
    pub dollars: f64,
}

/// Builds portfolio targets from ranked index holdings and custom stocks.
///
/// With `rescale_top_to_full` the holdings stand for the whole index slice (100 points);
/// otherwise they keep their real summed weight and the remainder of the index is left
/// unmodeled. Custom weights are points of the total portfolio and are added on top, then
/// everything is scaled so the targets sum to 100.
///
/// When the holdings weigh nothing the index slice is skipped and custom stocks alone span the
/// portfolio. Symbols present in both inputs are not merged here.
pub fn build_targets(
    holdings: &[Holding],
    rescale_top_to_full: bool,
    custom: &[CustomStock],
) -> TargetSet {
    let top_sum = sum_weights_pct(holdings);
    let has_index_slice = top_sum > 0.0 && top_sum.is_finite();

    let index_portion_pct = match (has_index_slice, rescale_top_to_full) {
        (false, _) => 0.0,
        (true, true) => 100.0,
        (true, false) => top_sum,
    };
    let custom_sum: f64 = custom.iter().map(|c| finite_or_zero(c.weight_pct)).sum();
    let total_target_pct = index_portion_pct + custom_sum;

    let meta = TargetMeta {
        top_sum,
        index_portion_pct,
        custom_sum,
        total_target_pct,
    };

    if total_target_pct == 0.0 || !total_target_pct.is_finite() {
        debug!(?meta, "No target weight to distribute");
        return TargetSet {
            meta,
            targets: Vec::new(),
        };
    }

    let mut targets = Vec::with_capacity(holdings.len() + custom.len());

    if has_index_slice {
        for h in holdings {
            let within_index = finite_or_zero(h.weight_pct) / top_sum * index_portion_pct;
            targets.push(Target {
                symbol: h.symbol.clone(),
                name: h.name.clone(),
                target_pct: within_index / total_target_pct * 100.0,
            });
        }
    }

    for c in custom {
        let name = if c.name.is_empty() {
            c.symbol.clone()
        } else {
            c.name.clone()
        };
        targets.push(Target {
            symbol: c.symbol.clone(),
            name,
            target_pct: finite_or_zero(c.weight_pct) / total_target_pct * 100.0,
        });
    }

    targets.sort_by(|a, b| b.target_pct.total_cmp(&a.target_pct));
    debug!(?meta, count = targets.len(), "Built targets");

    TargetSet { meta, targets }
}

/// Splits `amount` across targets by their percentage.
pub fn allocate(targets: &[Target], amount: f64) -> Vec<Allocation> {
    targets
        .iter()
        .map(|t| Allocation {
            symbol: t.symbol.clone(),
            name: t.name.clone(),
            target_pct: t.target_pct,
            dollars: t.target_pct / 100.0 * amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn top_ten() -> Vec<Holding> {
        // Sums to 50.
        vec![
            Holding::new("AAPL", "Apple", 7.0),
            Holding::new("MSFT", "Microsoft", 6.0),
            Holding::new("NVDA", "NVIDIA", 6.0),
            Holding::new("AMZN", "Amazon", 5.0),
            Holding::new("META", "Meta", 5.0),
            Holding::new("AVGO", "Broadcom", 5.0),
            Holding::new("GOOGL", "Alphabet A", 4.5),
            Holding::new("GOOG", "Alphabet C", 4.5),
            Holding::new("TSLA", "Tesla", 4.0),
            Holding::new("COST", "Costco", 3.0),
        ]
    }

    fn sum(set: &TargetSet) -> f64 {
        set.targets.iter().map(|t| t.target_pct).sum()
    }

    fn pct_of(set: &TargetSet, symbol: &str) -> f64 {
        set.targets
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.target_pct)
            .unwrap()
    }

    #[test]
    fn test_actual_weights_with_custom_stock() {
        let custom = vec![CustomStock::new("VOO", "Vanguard S&P 500", 10.0)];
        let set = build_targets(&top_ten(), false, &custom);

        assert!((set.meta.top_sum - 50.0).abs() < EPS);
        assert!((set.meta.index_portion_pct - 50.0).abs() < EPS);
        assert!((set.meta.custom_sum - 10.0).abs() < EPS);
        assert!((set.meta.total_target_pct - 60.0).abs() < EPS);

        assert!((pct_of(&set, "AAPL") - 7.0 / 60.0 * 100.0).abs() < EPS);
        assert!((pct_of(&set, "VOO") - 10.0 / 60.0 * 100.0).abs() < EPS);
        assert!((sum(&set) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_rescaled_to_full() {
        let custom = vec![CustomStock::new("VOO", "", 25.0)];
        let set = build_targets(&top_ten(), true, &custom);

        assert_eq!(set.meta.index_portion_pct, 100.0);
        assert_eq!(set.meta.total_target_pct, 125.0);
        // AAPL is 14% of the index slice, which is 80% of the portfolio.
        assert!((pct_of(&set, "AAPL") - 11.2).abs() < EPS);
        assert!((pct_of(&set, "VOO") - 20.0).abs() < EPS);
        assert!((sum(&set) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_rescaled_without_custom_keeps_proportions() {
        let set = build_targets(&top_ten(), true, &[]);
        assert!((pct_of(&set, "AAPL") - 14.0).abs() < EPS);
        assert!((sum(&set) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_targets_sorted_descending() {
        let custom = vec![CustomStock::new("VOO", "", 30.0)];
        let set = build_targets(&top_ten(), false, &custom);
        assert_eq!(set.targets[0].symbol, "VOO");
        assert!(
            set.targets
                .windows(2)
                .all(|w| w[0].target_pct >= w[1].target_pct)
        );
    }

    #[test]
    fn test_empty_holdings_guarded() {
        let custom = vec![
            CustomStock::new("VOO", "", 30.0),
            CustomStock::new("BND", "", 10.0),
        ];
        let set = build_targets(&[], true, &custom);
        assert_eq!(set.meta.index_portion_pct, 0.0);
        assert_eq!(set.targets.len(), 2);
        assert!((pct_of(&set, "VOO") - 75.0).abs() < EPS);
        assert!(set.targets.iter().all(|t| t.target_pct.is_finite()));
    }

    #[test]
    fn test_nothing_to_distribute() {
        let set = build_targets(&[], false, &[]);
        assert!(set.targets.is_empty());
        assert_eq!(set.meta.total_target_pct, 0.0);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let custom = vec![CustomStock::new("AAPL", "Apple extra", 5.0)];
        let set = build_targets(&top_ten(), false, &custom);
        assert_eq!(set.targets.iter().filter(|t| t.symbol == "AAPL").count(), 2);
    }

    #[test]
    fn test_idempotent() {
        let custom = vec![CustomStock::new("VOO", "", 12.5)];
        let first = build_targets(&top_ten(), false, &custom);
        let second = build_targets(&top_ten(), false, &custom);
        assert_eq!(first, second);
    }

    #[test]
    fn test_allocate_amount() {
        let set = build_targets(&top_ten(), true, &[]);
        let allocations = allocate(&set.targets, 10_000.0);
        let aapl = allocations.iter().find(|a| a.symbol == "AAPL").unwrap();
        assert!((aapl.dollars - 1400.0).abs() < 1e-6);
        let total: f64 = allocations.iter().map(|a| a.dollars).sum();
        assert!((total - 10_000.0).abs() < 1e-6);
    }
}
