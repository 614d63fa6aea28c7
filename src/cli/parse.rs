use super::{AppContext, ui};
use crate::core::extract::{extract_holdings, parse_holdings_with_shadow};
use crate::core::format::usd;
use crate::core::ocr::extract_holdings_from_image;
use crate::core::rebalance::{CurrentValues, current_total};
use anyhow::{Context, Result};
use comfy_table::{Cell, Color, Table};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseArgs {
    /// Text or image file; text is read from stdin when absent.
    pub input: Option<PathBuf>,
    /// Treat the input as a screenshot and run OCR first.
    pub ocr: bool,
    /// Accept every ticker instead of only the tracked portfolio symbols.
    pub all: bool,
}

pub async fn run(ctx: &AppContext, args: &ParseArgs) -> Result<()> {
    let (values, tracked) = extract_values(ctx, args).await?;

    if values.is_empty() {
        println!("No holdings found in the input.");
        return Ok(());
    }

    println!("{}", values_table(&values, &tracked));
    println!(
        "{} {}",
        ui::style_text("Total:", ui::StyleType::TotalLabel),
        ui::style_text(&usd(current_total(&values)), ui::StyleType::TotalValue)
    );
    Ok(())
}

/// Extracted values and the tracked symbols they were filtered against (empty with `--all`).
///
/// Pasted text also keeps untracked tickers through the shadow pass. Screenshots only yield
/// tracked symbols, since the wide OCR window would turn surrounding words into holdings.
async fn extract_values(
    ctx: &AppContext,
    args: &ParseArgs,
) -> Result<(CurrentValues, BTreeSet<String>)> {
    let bytes = read_bytes(args.input.as_ref())?;
    let (allowed, resolver) = if args.all {
        (None, ctx.resolver())
    } else {
        let (_, model) = ctx.portfolio().await?;
        (Some(model.allowed_symbols()), model.resolver)
    };
    let filter = allowed.as_ref();

    let values = if args.ocr {
        let pb = ui::new_progress_bar("Recognizing text...");
        let progress = |p: u8| pb.set_position(u64::from(p));
        let values = extract_holdings_from_image(
            ctx.recognizer.as_ref(),
            &bytes,
            filter,
            &resolver,
            &ctx.config.extraction.ocr_options(),
            &progress,
        )
        .await;
        pb.finish_and_clear();
        values?
    } else {
        let text = String::from_utf8_lossy(&bytes);
        let options = ctx.config.extraction.paste_options();
        match filter {
            Some(allowed) => parse_holdings_with_shadow(&text, allowed, &resolver, &options),
            None => extract_holdings(&text, None, &resolver, &options),
        }
    };

    Ok((values, allowed.unwrap_or_default()))
}

fn read_bytes(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn values_table(values: &CurrentValues, tracked: &BTreeSet<String>) -> Table {
    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Symbol"), ui::header_cell("Value")];
    if !tracked.is_empty() {
        header.push(ui::header_cell("Tracked"));
    }
    table.set_header(header);

    for (symbol, value) in values {
        let mut row = vec![Cell::new(symbol), ui::money_cell(*value)];
        if !tracked.is_empty() {
            row.push(if tracked.contains(symbol) {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::DarkGrey)
            });
        }
        table.add_row(row);
    }
    table
}
