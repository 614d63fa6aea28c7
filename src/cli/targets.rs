use super::{AppContext, ui};
use crate::core::format::{parse_number, pct, usd};
use crate::core::targets::{Allocation, TargetMeta, TargetSet, allocate};
use anyhow::Result;
use comfy_table::{Cell, Table};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetsArgs {
    /// Investment amount to split, free-form (`$10,000`).
    pub amount: Option<String>,
    /// Overrides the configured weighting when set.
    pub rescale: Option<bool>,
}

pub async fn run(ctx: &AppContext, args: &TargetsArgs) -> Result<()> {
    let (_, model) = ctx.portfolio().await?;
    let set = model.targets(ctx.rescale(args.rescale));

    if set.targets.is_empty() {
        println!("No targets: the snapshot has no holdings and no custom stocks are defined.");
        return Ok(());
    }

    let amount = args.amount.as_deref().map(parse_number);
    let allocations = amount.map(|a| allocate(&set.targets, a));

    println!("{}", ui::style_text("Target weights", ui::StyleType::Title));
    println!("{}", targets_table(&set, allocations.as_deref()));
    println!("{}", ui::style_text(&meta_line(&set.meta), ui::StyleType::Subtle));
    if let Some(amount) = amount {
        println!(
            "{} {}",
            ui::style_text("Investment:", ui::StyleType::TotalLabel),
            ui::style_text(&usd(amount), ui::StyleType::TotalValue)
        );
    }
    Ok(())
}

pub fn meta_line(meta: &TargetMeta) -> String {
    format!(
        "Index slice {} (holdings sum {}) + custom {} = {} before normalizing",
        pct(meta.index_portion_pct),
        pct(meta.top_sum),
        pct(meta.custom_sum),
        pct(meta.total_target_pct)
    )
}

fn targets_table(set: &TargetSet, allocations: Option<&[Allocation]>) -> Table {
    let mut table = ui::new_styled_table();
    let mut header = vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Target"),
    ];
    if allocations.is_some() {
        header.push(ui::header_cell("Amount"));
    }
    table.set_header(header);

    for (i, target) in set.targets.iter().enumerate() {
        let mut row = vec![
            Cell::new(&target.symbol),
            Cell::new(&target.name),
            ui::pct_cell(target.target_pct),
        ];
        if let Some(alloc) = allocations.and_then(|a| a.get(i)) {
            row.push(ui::money_cell(alloc.dollars));
        }
        table.add_row(row);
    }
    table
}
