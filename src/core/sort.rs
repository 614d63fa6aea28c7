//! Stateless table sorting with click-to-toggle direction.

use crate::core::rebalance::PlanRow;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<K> {
    pub key: K,
    pub dir: SortDir,
}

/// A sortable cell value. Cells without a value are represented by `None` at the accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Number(f64),
    Text(String),
}

/// Same key toggles the direction; a new key starts ascending.
pub fn next_sort<K: PartialEq>(current: Option<&SortState<K>>, key: K) -> SortState<K> {
    match current {
        Some(state) if state.key == key => SortState {
            key,
            dir: match state.dir {
                SortDir::Asc => SortDir::Desc,
                SortDir::Desc => SortDir::Asc,
            },
        },
        _ => SortState {
            key,
            dir: SortDir::Asc,
        },
    }
}

/// Returns a sorted copy of `rows`. Without a sort state the input order is kept.
///
/// Missing values always go last, whichever the direction. Numbers compare numerically,
/// everything else case-insensitively as text. The sort is stable.
pub fn sort_rows<T, K, F>(rows: &[T], sort: Option<&SortState<K>>, value: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &K) -> Option<SortValue>,
{
    let mut sorted = rows.to_vec();
    let Some(sort) = sort else {
        return sorted;
    };

    sorted.sort_by(|a, b| {
        match (value(a, &sort.key), value(b, &sort.key)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(av), Some(bv)) => {
                let ord = compare_values(&av, &bv);
                match sort.dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            }
        }
    });
    sorted
}

fn compare_values(a: &SortValue, b: &SortValue) -> Ordering {
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        _ => text_of(a).to_lowercase().cmp(&text_of(b).to_lowercase()),
    }
}

fn text_of(value: &SortValue) -> String {
    match value {
        SortValue::Number(n) => n.to_string(),
        SortValue::Text(s) => s.clone(),
    }
}

/// Direction glyph for a column header, empty when the column is not the sort key.
pub fn sort_indicator<K: PartialEq>(sort: Option<&SortState<K>>, key: &K) -> &'static str {
    match sort {
        Some(state) if &state.key == key => match state.dir {
            SortDir::Asc => " ▲",
            SortDir::Desc => " ▼",
        },
        _ => "",
    }
}

/// Columns of a rebalance plan table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanColumn {
    Symbol,
    Name,
    TargetPct,
    Current,
    TargetValue,
    Delta,
    SuggestedBuy,
}

impl PlanColumn {
    pub fn value(row: &PlanRow, column: &PlanColumn) -> Option<SortValue> {
        match column {
            PlanColumn::Symbol => Some(SortValue::Text(row.symbol.clone())),
            PlanColumn::Name => Some(SortValue::Text(row.name.clone())),
            PlanColumn::TargetPct => Some(SortValue::Number(row.target_pct)),
            PlanColumn::Current => Some(SortValue::Number(row.current)),
            PlanColumn::TargetValue => Some(SortValue::Number(row.target_value)),
            PlanColumn::Delta => Some(SortValue::Number(row.delta)),
            PlanColumn::SuggestedBuy => row.suggested_buy.map(SortValue::Number),
        }
    }
}
