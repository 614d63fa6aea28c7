use super::{AppContext, ui};
use crate::core::format::parse_number;
use crate::core::holdings::CustomStock;
use crate::store::{add_or_update, remove};
use anyhow::Result;
use comfy_table::Cell;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum CustomCommand {
    Add {
        symbol: String,
        name: Option<String>,
        weight: String,
    },
    Remove {
        symbol: String,
    },
    List,
}

pub fn run(ctx: &AppContext, command: &CustomCommand) -> Result<()> {
    let stocks = ctx.store.load();

    match command {
        CustomCommand::Add {
            symbol,
            name,
            weight,
        } => {
            let stock = CustomStock::new(
                symbol,
                name.as_deref().unwrap_or_default(),
                parse_number(weight),
            );
            let updated = add_or_update(&stocks, stock)?;
            ctx.store.save(&updated)?;
            info!(symbol = %symbol, "Saved custom stock");
            print_list(&updated);
        }
        CustomCommand::Remove { symbol } => {
            let updated = remove(&stocks, symbol);
            if updated.len() == stocks.len() {
                println!("{} is not a custom stock.", symbol.trim().to_uppercase());
                return Ok(());
            }
            ctx.store.save(&updated)?;
            print_list(&updated);
        }
        CustomCommand::List => print_list(&stocks),
    }
    Ok(())
}

fn print_list(stocks: &[CustomStock]) {
    if stocks.is_empty() {
        println!("No custom stocks defined.");
        return;
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Weight"),
    ]);
    for stock in stocks {
        table.add_row(vec![
            Cell::new(&stock.symbol),
            Cell::new(&stock.name),
            ui::pct_cell(stock.weight_pct),
        ]);
    }
    println!("{table}");

    let total: f64 = stocks.iter().map(|s| s.weight_pct).sum();
    println!(
        "{} {}",
        ui::style_text("Custom total:", ui::StyleType::TotalLabel),
        ui::style_text(&crate::core::format::pct(total), ui::StyleType::TotalValue)
    );
}
