use super::{AppContext, ui};
use crate::core::extract::parse_holdings_with_shadow;
use crate::core::format::{parse_number, usd};
use crate::core::ocr::extract_holdings_from_image;
use crate::core::portfolio::PortfolioModel;
use crate::core::rebalance::{Action, CurrentValues, Policy, RebalancePlan, current_total, plan};
use crate::core::sort::{PlanColumn, SortState, next_sort, sort_indicator, sort_rows};
use anyhow::{Context, Result, bail};
use comfy_table::{Cell, Color, Table};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebalanceArgs {
    pub new_total: Option<String>,
    pub additional: Option<String>,
    /// `SYMBOL=VALUE` pairs, applied after any pasted or recognized values.
    pub set: Vec<String>,
    pub paste: Option<PathBuf>,
    pub image: Option<PathBuf>,
    pub sort: Option<PlanColumn>,
    pub desc: bool,
    pub rescale: Option<bool>,
}

const COLUMNS: [(PlanColumn, &str); 7] = [
    (PlanColumn::Symbol, "Symbol"),
    (PlanColumn::Name, "Name"),
    (PlanColumn::TargetPct, "Target"),
    (PlanColumn::Current, "Current"),
    (PlanColumn::TargetValue, "Target value"),
    (PlanColumn::Delta, "Delta"),
    (PlanColumn::SuggestedBuy, "Suggested buy"),
];

pub async fn run(ctx: &AppContext, args: &RebalanceArgs) -> Result<()> {
    let (_, model) = ctx.portfolio().await?;
    let set = model.targets(ctx.rescale(args.rescale));
    let current = collect_current(ctx, &model, args).await?;
    let policy = resolve_policy(
        args.new_total.as_deref(),
        args.additional.as_deref(),
        current_total(&current),
    )?;
    debug!(?policy, holdings = current.len(), "Planning rebalance");

    let result = plan(&set.targets, &current, policy);
    let sort = sort_state(args.sort, args.desc);

    println!("{}", ui::style_text("Rebalance plan", ui::StyleType::Title));
    println!("{}", plan_table(&result, sort.as_ref()));
    print_summary(&result);
    Ok(())
}

/// `--new-total` and `--additional` are exclusive; with neither the current total is kept.
pub fn resolve_policy(
    new_total: Option<&str>,
    additional: Option<&str>,
    current_total: f64,
) -> Result<Policy> {
    match (new_total, additional) {
        (Some(_), Some(_)) => bail!("Use either --new-total or --additional, not both"),
        (Some(total), None) => Ok(Policy::NewTotal(parse_number(total))),
        (None, Some(extra)) => Ok(Policy::Additional(parse_number(extra))),
        (None, None) => Ok(Policy::NewTotal(current_total)),
    }
}

/// Parses `SYMBOL=VALUE`; the value goes through the lenient number parser.
pub fn parse_assignment(input: &str) -> Result<(String, f64)> {
    let Some((symbol, value)) = input.split_once('=') else {
        bail!("Expected SYMBOL=VALUE, got `{input}`");
    };
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        bail!("Missing symbol in `{input}`");
    }
    Ok((symbol, parse_number(value)))
}

async fn collect_current(
    ctx: &AppContext,
    model: &PortfolioModel,
    args: &RebalanceArgs,
) -> Result<CurrentValues> {
    let allowed = model.allowed_symbols();
    let mut current = CurrentValues::new();

    if let Some(path) = &args.paste {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let options = ctx.config.extraction.paste_options();
        current.extend(parse_holdings_with_shadow(
            &text,
            &allowed,
            &model.resolver,
            &options,
        ));
    }

    if let Some(path) = &args.image {
        let image =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let pb = ui::new_progress_bar("Recognizing text...");
        let progress = |p: u8| pb.set_position(u64::from(p));
        let values = extract_holdings_from_image(
            ctx.recognizer.as_ref(),
            &image,
            Some(&allowed),
            &model.resolver,
            &ctx.config.extraction.ocr_options(),
            &progress,
        )
        .await;
        pb.finish_and_clear();
        current.extend(values?);
    }

    for assignment in &args.set {
        let (symbol, value) = parse_assignment(assignment)?;
        current.insert(model.canonical_symbol(&symbol), value);
    }

    Ok(current)
}

fn sort_state(column: Option<PlanColumn>, desc: bool) -> Option<SortState<PlanColumn>> {
    column.map(|key| {
        let state = next_sort(None, key);
        if desc {
            next_sort(Some(&state), key)
        } else {
            state
        }
    })
}

fn plan_table(result: &RebalancePlan, sort: Option<&SortState<PlanColumn>>) -> Table {
    let with_buys = result.additional.is_some();
    let columns: Vec<_> = COLUMNS
        .iter()
        .filter(|(col, _)| with_buys || *col != PlanColumn::SuggestedBuy)
        .collect();

    let mut table = ui::new_styled_table();
    let mut header: Vec<Cell> = columns
        .iter()
        .map(|(col, label)| ui::header_cell(&format!("{label}{}", sort_indicator(sort, col))))
        .collect();
    header.push(ui::header_cell("Action"));
    table.set_header(header);

    for row in sort_rows(&result.rows, sort, PlanColumn::value) {
        let mut cells: Vec<Cell> = columns
            .iter()
            .map(|(col, _)| match col {
                PlanColumn::Symbol => Cell::new(&row.symbol),
                PlanColumn::Name => Cell::new(&row.name),
                PlanColumn::TargetPct => ui::pct_cell(row.target_pct),
                PlanColumn::Current => ui::money_cell(row.current),
                PlanColumn::TargetValue => ui::money_cell(row.target_value),
                PlanColumn::Delta => ui::delta_cell(row.delta),
                PlanColumn::SuggestedBuy => row.suggested_buy.map_or_else(ui::na_cell, ui::money_cell),
            })
            .collect();
        cells.push(action_cell(row.action()));
        table.add_row(cells);
    }
    table
}

fn action_cell(action: Action) -> Cell {
    match action {
        Action::Buy => Cell::new("Buy").fg(Color::Green),
        Action::Sell => Cell::new("Sell").fg(Color::Red),
        Action::Hold => Cell::new("Hold").fg(Color::DarkGrey),
    }
}

fn print_summary(result: &RebalancePlan) {
    let line = |label: &str, value: f64| {
        println!(
            "{} {}",
            ui::style_text(label, ui::StyleType::TotalLabel),
            ui::style_text(&usd(value), ui::StyleType::TotalValue)
        );
    };
    line("Current total:", result.current_total);
    line("New total:", result.new_total);
    if let Some(additional) = result.additional {
        line("Additional cash:", additional);
        line("Suggested buys:", result.total_suggested_buy());
    }
    if result.current_total == 0.0 && result.new_total == 0.0 {
        println!(
            "{}",
            ui::style_text(
                "Enter current values with --set, --paste or --image, or pass --new-total.",
                ui::StyleType::Subtle
            )
        );
    }
}
