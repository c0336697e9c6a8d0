use serde::{Deserialize, Serialize};

use crate::data::model::{MenuItem, MenuTable, Nutrient};

/// Ranking length used when callers do not pass one.
pub const DEFAULT_TOP_N: usize = 10;

/// The `n` items with the highest value of `nutrient`, highest first.
///
/// Items missing the value are skipped; ties keep table order. Returns
/// fewer than `n` items when the column has fewer values.
pub fn top_n(table: &MenuTable, nutrient: Nutrient, n: usize) -> Vec<MenuItem> {
    let mut ranked: Vec<(&MenuItem, f64)> = table
        .items
        .iter()
        .filter_map(|it| it.get(nutrient).map(|v| (it, v)))
        .collect();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.into_iter().take(n).map(|(it, _)| it.clone()).collect()
}

/// One ranked entry, as persisted in the metrics report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub name: String,
    pub value: f64,
}

/// A top-N list together with the column it was ranked by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub column: Nutrient,
    pub items: Vec<RankedItem>,
}

impl Ranking {
    pub fn build(table: &MenuTable, column: Nutrient, n: usize) -> Self {
        let items = top_n(table, column, n)
            .into_iter()
            .filter_map(|it| {
                Some(RankedItem {
                    value: it.get(column)?,
                    name: it.name,
                })
            })
            .collect();
        Self { column, items }
    }
}
