//! Extracts `{symbol: dollar value}` maps from pasted or OCR-recognized text.
//!
//! Each line is scanned for a ticker (1-6 letters) and a money token such as `$8.83K`,
//! `8,830.22` or `7230`. Pasted text pairs the ticker with a value on the same line; OCR
//! output often splits the two, so the OCR options look a few lines ahead. Extraction never
//! fails: unrecognized lines are skipped and an empty map means nothing matched.

use crate::core::alias::{AliasGroup, AliasResolver};
use crate::core::format::parse_number;
use crate::core::rebalance::CurrentValues;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

static TICKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{1,6}\b").expect("ticker pattern is valid"));

// Suffixed amounts first, then comma-grouped numbers, then plain decimals.
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\$?\s*\d+(?:[.,]\d+)?\s*[KMB]\b|\$?\s*\d{1,3}(?:,\d{3})+(?:\.\d+)?|\$?\s*\d+(?:\.\d+)?",
    )
    .expect("money pattern is valid")
});

static ABBREV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$?(\d+(?:[.,]\d+)?)([KMB])$").expect("abbreviation pattern is valid")
});

/// Tuning of the line scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    /// Lines searched for a money token, starting at the ticker line.
    pub lookahead: usize,
    /// Smallest accepted value. Values must also be positive.
    pub min_value: f64,
}

impl ExtractOptions {
    pub const fn paste() -> Self {
        Self {
            lookahead: 1,
            min_value: 0.0,
        }
    }

    /// Looks six lines ahead and drops values under 100, which are usually share counts.
    pub const fn ocr() -> Self {
        Self {
            lookahead: 6,
            min_value: 100.0,
        }
    }

    fn accepts(&self, value: f64) -> bool {
        value.is_finite() && value > 0.0 && value >= self.min_value
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::paste()
    }
}

/// Converts a money token to dollars, honoring `K`/`M`/`B` suffixes.
///
/// A comma in a suffixed token is read as a decimal separator (`8,83K` is 8830).
pub fn parse_money(token: &str) -> f64 {
    let raw: String = token
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if let Some(caps) = ABBREV_RE.captures(&raw) {
        let number = parse_number(&caps[1].replace(',', "."));
        let multiplier = match &caps[2] {
            "K" => 1e3,
            "M" => 1e6,
            _ => 1e9,
        };
        return number * multiplier;
    }

    parse_number(&raw)
}

#[derive(Debug, Clone)]
struct LineMatch {
    line: usize,
    raw: String,
    symbol: String,
    value: f64,
}

fn prepare_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().to_uppercase())
        .filter(|l| !l.is_empty())
        .collect()
}

fn has_suffix(token: &str) -> bool {
    token.trim_end().ends_with(['K', 'M', 'B'])
}

/// A lone `K`/`M`/`B` right after a number is the amount's suffix, as in `$ 1.5 M`.
fn is_amount_suffix(line: &str, m: &regex::Match<'_>) -> bool {
    matches!(m.as_str(), "K" | "M" | "B")
        && line[..m.start()]
            .trim_end()
            .ends_with(|c: char| c.is_ascii_digit())
}

/// Best money token in the window: the first suffixed one, else the first one found.
fn find_money_near<'a>(lines: &'a [String], start: usize, lookahead: usize) -> Option<&'a str> {
    let end = lines.len().min(start + lookahead.max(1));
    let mut fallback = None;

    for line in &lines[start..end] {
        for m in MONEY_RE.find_iter(line) {
            let token = m.as_str();
            if has_suffix(token) {
                return Some(token);
            }
            fallback.get_or_insert(token);
        }
    }
    fallback
}

fn scan_lines(
    lines: &[String],
    allowed: Option<&BTreeSet<String>>,
    resolver: &AliasResolver,
    options: &ExtractOptions,
) -> Vec<LineMatch> {
    let mut matches = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let ticker = TICKER_RE.find_iter(line).find_map(|m| {
            if is_amount_suffix(line, &m) {
                return None;
            }
            let raw = m.as_str();
            let symbol = resolver.resolve(raw);
            match allowed {
                Some(set) if !set.contains(symbol) => None,
                _ => Some((raw.to_string(), symbol.to_string())),
            }
        });
        let Some((raw, symbol)) = ticker else {
            continue;
        };

        let Some(token) = find_money_near(lines, i, options.lookahead) else {
            debug!(%symbol, line = i, "No money token near ticker");
            continue;
        };

        let value = parse_money(token);
        if !options.accepts(value) {
            debug!(%symbol, value, "Rejected value below threshold");
            continue;
        }

        matches.push(LineMatch {
            line: i,
            raw,
            symbol,
            value,
        });
    }

    matches
}

/// Folds matches into a map. Alias members are summed into their combined symbol; any other
/// repeated symbol keeps its last value.
fn collect_matches(matches: &[LineMatch]) -> CurrentValues {
    let mut out = CurrentValues::new();
    let mut alias_parts: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();

    for m in matches {
        if m.raw == m.symbol {
            out.insert(m.symbol.clone(), m.value);
        } else {
            alias_parts
                .entry(m.symbol.as_str())
                .or_default()
                .insert(m.raw.as_str(), m.value);
        }
    }

    for (symbol, parts) in alias_parts {
        out.insert(symbol.to_string(), parts.values().sum());
    }
    out
}

fn active_resolver(allowed: Option<&BTreeSet<String>>, resolver: &AliasResolver) -> AliasResolver {
    allowed.map_or_else(AliasResolver::default, |set| resolver.active_for(set))
}

/// Extracts holdings from `text`.
///
/// With an `allowed` set only those symbols are kept, and members of an alias group whose
/// combined symbol is allowed are remapped to it. Without one any syntactically valid ticker
/// is accepted and no alias remapping happens.
pub fn extract_holdings(
    text: &str,
    allowed: Option<&BTreeSet<String>>,
    resolver: &AliasResolver,
    options: &ExtractOptions,
) -> CurrentValues {
    let lines = prepare_lines(text);
    let resolver = active_resolver(allowed, resolver);
    let matches = scan_lines(&lines, allowed, &resolver, options);
    debug!(lines = lines.len(), matches = matches.len(), "Extracted holdings");
    collect_matches(&matches)
}

/// Two-pass extraction that also keeps holdings outside the allowed set.
///
/// The filtered pass resolves aliases and wins every conflict. The unfiltered pass adds the
/// remaining tickers as shadow holdings, except on lines the filtered pass already used and
/// for raw members of an active alias group.
pub fn parse_holdings_with_shadow(
    text: &str,
    allowed: &BTreeSet<String>,
    resolver: &AliasResolver,
    options: &ExtractOptions,
) -> CurrentValues {
    let lines = prepare_lines(text);
    let active = resolver.active_for(allowed);

    let filtered = scan_lines(&lines, Some(allowed), &active, options);
    let claimed: HashSet<usize> = filtered.iter().map(|m| m.line).collect();

    let unfiltered: Vec<LineMatch> = scan_lines(&lines, None, &AliasResolver::default(), options)
        .into_iter()
        .filter(|m| !claimed.contains(&m.line) && !active.is_member(&m.symbol))
        .collect();

    let mut out = collect_matches(&filtered);
    let filtered_count = out.len();
    for (symbol, value) in collect_matches(&unfiltered) {
        out.entry(symbol).or_insert(value);
    }
    debug!(
        filtered = filtered_count,
        shadow = out.len() - filtered_count,
        "Extracted holdings with shadow pass"
    );
    out
}

/// Parses pasted text with the paste thresholds and the default alias groups.
pub fn parse_holdings_paste(text: &str, allowed: Option<&BTreeSet<String>>) -> CurrentValues {
    let resolver = AliasResolver::new(vec![AliasGroup::alphabet()]);
    extract_holdings(text, allowed, &resolver, &ExtractOptions::paste())
}

/// Parses OCR output with the OCR thresholds and the default alias groups.
pub fn parse_holdings_from_text(text: &str, allowed: Option<&BTreeSet<String>>) -> CurrentValues {
    let resolver = AliasResolver::new(vec![AliasGroup::alphabet()]);
    extract_holdings(text, allowed, &resolver, &ExtractOptions::ocr())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(symbols: &[&str]) -> BTreeSet<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    fn value(map: &CurrentValues, symbol: &str) -> f64 {
        *map.get(symbol).unwrap()
    }

    #[test]
    fn test_parse_money_tokens() {
        assert!((parse_money("$8.83K") - 8830.0).abs() < 1e-6);
        assert!((parse_money("8,83k") - 8830.0).abs() < 1e-6);
        assert!((parse_money("$ 1.2 M") - 1_200_000.0).abs() < 1e-6);
        assert!((parse_money("0.95B") - 950_000_000.0).abs() < 1e-3);
        assert_eq!(parse_money("8,830.22"), 8830.22);
        assert_eq!(parse_money("garbage"), 0.0);
        assert_eq!(parse_money(""), 0.0);
    }

    #[test]
    fn test_paste_single_line_formats() {
        let out = parse_holdings_paste("NVDA $8.83K", None);
        assert_eq!(out.len(), 1);
        assert!((value(&out, "NVDA") - 8830.0).abs() < 1e-6);

        let out = parse_holdings_paste("MSFT=7230", None);
        assert_eq!(out, CurrentValues::from([("MSFT".to_string(), 7230.0)]));

        let out = parse_holdings_paste("AAPL: 6,350", None);
        assert_eq!(out, CurrentValues::from([("AAPL".to_string(), 6350.0)]));
    }

    #[test]
    fn test_paste_multiline_with_filter() {
        let text = "nvda $8.83K\r\n\nMSFT 7,230.50\nTSLA 1500\nnothing here\n";
        let out = parse_holdings_paste(text, Some(&set(&["NVDA", "MSFT"])));
        assert_eq!(out.len(), 2);
        assert_eq!(value(&out, "MSFT"), 7230.5);
        assert!(!out.contains_key("TSLA"));
    }

    #[test]
    fn test_paste_prefers_first_allowed_ticker_on_line() {
        let text = "Apple Inc AAPL $6.35K";
        let out = parse_holdings_paste(text, Some(&set(&["AAPL"])));
        assert!((value(&out, "AAPL") - 6350.0).abs() < 1e-6);
    }

    #[test]
    fn test_paste_prefers_suffixed_amount() {
        let out = parse_holdings_paste("GOOGL 12 shares $2.5K", None);
        assert!((value(&out, "GOOGL") - 2500.0).abs() < 1e-6);
    }

    #[test]
    fn test_paste_rejects_non_positive() {
        let out = parse_holdings_paste("AMZN 0\nMETA $0.00", None);
        assert!(out.is_empty());
    }

    #[test]
    fn test_alias_members_are_summed() {
        let text = "GOOG $1K\nGOOGL $2K\nMSFT $3K";
        let out = parse_holdings_paste(text, Some(&set(&["GOOG+GOOGL", "MSFT"])));
        assert_eq!(out.len(), 2);
        assert!((value(&out, "GOOG+GOOGL") - 3000.0).abs() < 1e-6);
        assert!(!out.contains_key("GOOG"));
    }

    #[test]
    fn test_alias_inactive_without_combined_symbol() {
        let out = parse_holdings_paste("GOOG $1K\nGOOGL $2K", Some(&set(&["GOOG", "GOOGL"])));
        assert_eq!(out.len(), 2);
        assert!((value(&out, "GOOGL") - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_symbol_keeps_last_value() {
        let out = parse_holdings_paste("NVDA 100\nNVDA 200", None);
        assert_eq!(value(&out, "NVDA"), 200.0);
    }

    #[test]
    fn test_ocr_value_on_following_line() {
        let text = "NVDA\nNVIDIA Corp\n46.73 shares\n$8.83K\nMSFT\n$7.23K";
        let out = parse_holdings_from_text(text, Some(&set(&["NVDA", "MSFT"])));
        assert!((value(&out, "NVDA") - 8830.0).abs() < 1e-6);
        assert!((value(&out, "MSFT") - 7230.0).abs() < 1e-6);
    }

    #[test]
    fn test_ocr_rejects_share_counts() {
        let text = "AAPL\n46.73";
        let out = parse_holdings_from_text(text, Some(&set(&["AAPL"])));
        assert!(out.is_empty());
    }

    #[test]
    fn test_ocr_window_is_bounded() {
        let text = "AAPL\nline\nline\nline\nline\nline\n$9.99K";
        let out = parse_holdings_from_text(text, Some(&set(&["AAPL"])));
        assert!(out.is_empty());
    }

    #[test]
    fn test_ocr_without_filter_accepts_any_ticker() {
        let out = parse_holdings_from_text("ZS $1.5K", None);
        assert!((value(&out, "ZS") - 1500.0).abs() < 1e-6);
    }

    #[test]
    fn test_configurable_threshold() {
        let resolver = AliasResolver::default();
        let options = ExtractOptions {
            lookahead: 1,
            min_value: 5000.0,
        };
        let out = extract_holdings("NVDA $8.83K\nMSFT 4000", None, &resolver, &options);
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("NVDA"));
    }

    #[test]
    fn test_shadow_pass_keeps_dropped_symbols() {
        let resolver = AliasResolver::new(vec![AliasGroup::alphabet()]);
        let allowed = set(&["NVDA", "GOOG+GOOGL"]);
        let text = "NVDA $8.83K\nGOOG $1K\nGOOGL $2K\nINTC $1.1K";

        let out =
            parse_holdings_with_shadow(text, &allowed, &resolver, &ExtractOptions::paste());
        assert_eq!(out.len(), 3);
        assert!((value(&out, "GOOG+GOOGL") - 3000.0).abs() < 1e-6);
        assert!((value(&out, "INTC") - 1100.0).abs() < 1e-6);
        assert!(!out.contains_key("GOOG"));
        assert!(!out.contains_key("GOOGL"));
    }

    #[test]
    fn test_shadow_pass_skips_claimed_lines() {
        let resolver = AliasResolver::default();
        let allowed = set(&["AAPL"]);
        let out = parse_holdings_with_shadow(
            "Apple AAPL $6.35K",
            &allowed,
            &resolver,
            &ExtractOptions::paste(),
        );
        assert_eq!(out.len(), 1);
        assert!(out.contains_key("AAPL"));
    }

    #[test]
    fn test_spaced_suffix_is_not_a_ticker() {
        let resolver = AliasResolver::default();
        let allowed = set(&["NVDA"]);
        let out = parse_holdings_with_shadow(
            "NVDA $8.83K\n$ 1.5 M\nSCHD $ 2 K",
            &allowed,
            &resolver,
            &ExtractOptions::paste(),
        );
        assert_eq!(out.len(), 2);
        assert!(!out.contains_key("M"));
        assert!(!out.contains_key("K"));
        assert!((value(&out, "SCHD") - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_holdings_paste("", None).is_empty());
        assert!(parse_holdings_from_text("\n\n", None).is_empty());
    }
}
