use super::{AppContext, ui};
use crate::core::holdings::{IndexSnapshot, normalize_holdings, top_n};
use anyhow::Result;
use chrono::Local;
use comfy_table::{Cell, Table};

const SHOWN: usize = 20;

pub async fn run(ctx: &AppContext) -> Result<()> {
    let snapshot = ctx.snapshots.fetch_snapshot().await?;

    println!("{}", ui::style_text("Index holdings", ui::StyleType::Title));
    println!("{}", ui::style_text(&source_line(&snapshot), ui::StyleType::Subtle));
    println!("{}", holdings_table(&snapshot));
    Ok(())
}

fn source_line(snapshot: &IndexSnapshot) -> String {
    let fetched = snapshot
        .fetched_at()
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let or_unknown = |s: &str| {
        if s.is_empty() {
            "unknown".to_string()
        } else {
            s.to_string()
        }
    };
    format!(
        "Source: {} · As of close: {} · Fetched: {}",
        or_unknown(&snapshot.source),
        or_unknown(&snapshot.as_of_close),
        fetched
    )
}

fn holdings_table(snapshot: &IndexSnapshot) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Weight"),
    ]);

    let top = top_n(&normalize_holdings(snapshot), SHOWN);
    for (i, holding) in top.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&holding.symbol),
            Cell::new(&holding.name),
            ui::pct_cell(holding.weight_pct),
        ]);
    }
    table
}
