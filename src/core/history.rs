//! Selection of historical snapshots and weight drift between two of them.
use crate::core::holdings::Holding;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub start: Option<String>,
    pub end: Option<String>,
    pub dates_in_window: Vec<String>,
}

/// Picks the dates at most `window_days` before the latest date.
///
/// `dates_asc` must be ascending `YYYY-MM-DD` strings; dates that do not parse are skipped.
pub fn pick_dates_for_window(dates_asc: &[String], window_days: i64) -> DateWindow {
    let Some(end) = dates_asc.last() else {
        return DateWindow::default();
    };

    let end_date = parse_date(end);
    let dates_in_window: Vec<String> = dates_asc
        .iter()
        .filter(|d| match (parse_date(d), end_date) {
            (Some(date), Some(end_date)) => (end_date - date).num_days() <= window_days,
            _ => false,
        })
        .cloned()
        .collect();

    DateWindow {
        start: dates_in_window.first().cloned(),
        end: Some(end.clone()),
        dates_in_window,
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Weight of one symbol at the start and end of a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightChange {
    pub symbol: String,
    pub name: String,
    pub start_pct: Option<f64>,
    pub end_pct: Option<f64>,
}

impl WeightChange {
    /// Change in percentage points; a missing side counts as zero.
    pub fn change(&self) -> f64 {
        self.end_pct.unwrap_or(0.0) - self.start_pct.unwrap_or(0.0)
    }
}

/// Compares two holding lists symbol by symbol, heaviest current weight first. Symbols that
/// left the index come last.
pub fn weight_changes(start: &[Holding], end: &[Holding]) -> Vec<WeightChange> {
    let mut by_symbol: BTreeMap<&str, WeightChange> = BTreeMap::new();

    for h in start {
        by_symbol.insert(
            h.symbol.as_str(),
            WeightChange {
                symbol: h.symbol.clone(),
                name: h.name.clone(),
                start_pct: Some(h.weight_pct),
                end_pct: None,
            },
        );
    }
    for h in end {
        let entry = by_symbol
            .entry(h.symbol.as_str())
            .or_insert_with(|| WeightChange {
                symbol: h.symbol.clone(),
                name: h.name.clone(),
                start_pct: None,
                end_pct: None,
            });
        entry.name = h.name.clone();
        entry.end_pct = Some(h.weight_pct);
    }

    let mut changes: Vec<WeightChange> = by_symbol.into_values().collect();
    changes.sort_by(|a, b| match (a.end_pct, b.end_pct) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.symbol.cmp(&b.symbol),
    });
    changes
}
