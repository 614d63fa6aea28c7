use super::{AppContext, ui};
use crate::core::history::{WeightChange, pick_dates_for_window, weight_changes};
use crate::core::holdings::normalize_holdings;
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use futures::future::try_join;
use tracing::debug;

pub async fn run(ctx: &AppContext, days: i64) -> Result<()> {
    let history = ctx
        .history
        .as_deref()
        .context("No history source configured; add `history:` to the config file")?;

    let dates = history.load_index().await?;
    let window = pick_dates_for_window(&dates, days);
    debug!(
        start = ?window.start,
        end = ?window.end,
        count = window.dates_in_window.len(),
        "Picked window"
    );

    let (Some(start), Some(end)) = (window.start, window.end) else {
        println!("No history available.");
        return Ok(());
    };
    if start == end {
        println!("Only one snapshot ({end}) inside the last {days} days.");
        return Ok(());
    }

    let (start_snapshot, end_snapshot) =
        try_join(history.load_snapshot(&start), history.load_snapshot(&end)).await?;

    let resolver = ctx.resolver();
    let changes = weight_changes(
        &resolver.merge_holdings(&normalize_holdings(&start_snapshot)),
        &resolver.merge_holdings(&normalize_holdings(&end_snapshot)),
    );

    println!(
        "{}",
        ui::style_text(&format!("Weight change {start} → {end}"), ui::StyleType::Title)
    );
    println!("{}", changes_table(&changes, ctx.config.top_n.max(20)));
    Ok(())
}

fn changes_table(changes: &[WeightChange], limit: usize) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Start"),
        ui::header_cell("End"),
        ui::header_cell("Change"),
    ]);

    for change in changes.iter().take(limit) {
        table.add_row(vec![
            Cell::new(&change.symbol),
            Cell::new(&change.name),
            change.start_pct.map_or_else(ui::na_cell, ui::pct_cell),
            change.end_pct.map_or_else(ui::na_cell, ui::pct_cell),
            ui::change_cell(change.change()),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing;
    use crate::core::holdings::{Holding, IndexSnapshot};
    use crate::core::snapshot::HistoryProvider;
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct StaticHistory(BTreeMap<String, IndexSnapshot>);

    #[async_trait]
    impl HistoryProvider for StaticHistory {
        async fn load_index(&self) -> Result<Vec<String>> {
            Ok(self.0.keys().cloned().collect())
        }

        async fn load_snapshot(&self, date: &str) -> Result<IndexSnapshot> {
            self.0.get(date).cloned().context("missing snapshot")
        }
    }

    fn snapshot(holdings: Vec<Holding>) -> IndexSnapshot {
        IndexSnapshot {
            holdings,
            ..IndexSnapshot::default()
        }
    }

    #[tokio::test]
    async fn test_trend_over_window() {
        let mut dates = BTreeMap::new();
        dates.insert(
            "2026-08-01".to_string(),
            snapshot(vec![Holding::new("AAPL", "Apple", 9.0)]),
        );
        dates.insert(
            "2026-10-01".to_string(),
            snapshot(vec![
                Holding::new("AAPL", "Apple", 8.0),
                Holding::new("NVDA", "NVIDIA", 9.5),
            ]),
        );
        dates.insert(
            "2026-10-15".to_string(),
            snapshot(vec![
                Holding::new("AAPL", "Apple", 7.5),
                Holding::new("NVDA", "NVIDIA", 10.0),
            ]),
        );

        let mut ctx = testing::context(vec![], "");
        ctx.history = Some(Box::new(StaticHistory(dates)));
        run(&ctx, 30).await.unwrap();
    }

    #[tokio::test]
    async fn test_trend_requires_history() {
        let ctx = testing::context(vec![], "");
        let err = run(&ctx, 30).await.unwrap_err();
        assert!(err.to_string().contains("No history source"));
    }

    #[test]
    fn test_changes_table() {
        let changes = vec![WeightChange {
            symbol: "AAPL".to_string(),
            name: "Apple".to_string(),
            start_pct: Some(8.0),
            end_pct: None,
        }];
        let rendered = changes_table(&changes, 10).to_string();
        assert!(rendered.contains("8.00%"));
        assert!(rendered.contains("-8.00 pp"));
    }
}
