//! Raw rows → normalized, deduplicated menu table.

use std::collections::HashMap;

use super::columns::ColumnMapping;
use super::model::{MenuItem, MenuTable};

/// Tokens treated as "no value" in numeric columns.
const NA_VALUES: &[&str] = &["", "-", "na", "n/a", "null", "none", "nan"];

/// A single cell as read from a source, before coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Missing,
}

impl RawCell {
    /// Coerce to a finite number. Anything unparseable is missing.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            RawCell::Number(v) => v.is_finite().then_some(*v),
            RawCell::Text(s) => parse_number(s),
            RawCell::Missing => None,
        }
    }

    fn to_text(&self) -> String {
        match self {
            RawCell::Text(s) => s.clone(),
            RawCell::Number(v) => v.to_string(),
            RawCell::Missing => String::new(),
        }
    }
}

/// A header row plus untyped records, shared by every file format.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

/// Counters gathered while normalizing, logged by the loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows_read: usize,
    pub empty_names: usize,
    pub duplicates_merged: usize,
}

/// Parse a numeric cell: trims, drops thousands separators, honours NA tokens.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|&c| c != ',').collect();
    if NA_VALUES.contains(&cleaned.to_ascii_lowercase().as_str()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Trim and collapse internal runs of whitespace to one space.
pub fn clean_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Apply the column mapping to every row, coerce numbers and merge
/// case-insensitive duplicates.
pub fn normalize(raw: &RawTable, mapping: &ColumnMapping) -> (MenuTable, NormalizeReport) {
    let mut report = NormalizeReport {
        rows_read: raw.rows.len(),
        ..Default::default()
    };

    let mut items = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        let name = row
            .get(mapping.name)
            .map(|cell| clean_name(&cell.to_text()))
            .unwrap_or_default();
        if name.is_empty() {
            report.empty_names += 1;
            continue;
        }
        let mut item = MenuItem::new(name);
        for &(nutrient, idx) in &mapping.nutrients {
            item.set(nutrient, row.get(idx).and_then(RawCell::to_number));
        }
        items.push(item);
    }

    let before = items.len();
    let items = dedupe_by_name(items);
    report.duplicates_merged = before - items.len();

    let table = MenuTable {
        items,
        source_columns: mapping.nutrients.iter().map(|(n, _)| *n).collect(),
        encoding: None,
    };
    (table, report)
}

/// Merge rows sharing a case-insensitive name.
///
/// The first row of a group keeps its position and display name; each
/// nutrient takes the first non-missing value across the group in row order.
pub fn dedupe_by_name(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<MenuItem> = Vec::with_capacity(items.len());

    for item in items {
        match position.get(&item.key()) {
            Some(&idx) => {
                let target = &mut merged[idx];
                for nutrient in crate::data::model::Nutrient::ALL {
                    if target.get(nutrient).is_none() {
                        target.set(nutrient, item.get(nutrient));
                    }
                }
            }
            None => {
                position.insert(item.key(), merged.len());
                merged.push(item);
            }
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Nutrient;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    #[test]
    fn parse_number_handles_markers_and_commas() {
        assert_eq!(parse_number(" 250 "), Some(250.0));
        assert_eq!(parse_number("1,200"), Some(1200.0));
        assert_eq!(parse_number("0.5"), Some(0.5));
        for na in ["", "-", "NA", "n/a", "NULL", "None", "NaN", "varies", "inf"] {
            assert_eq!(parse_number(na), None, "{na}");
        }
    }

    #[test]
    fn clean_name_collapses_whitespace() {
        assert_eq!(clean_name("  Iced   Caffè\tLatte "), "Iced Caffè Latte");
    }

    #[test]
    fn duplicates_merge_first_non_missing_value() {
        let items = vec![
            MenuItem::new("Latte").with(Nutrient::Calories, 200.0),
            MenuItem::new("Tea").with(Nutrient::Calories, 5.0),
            MenuItem::new("LATTE").with(Nutrient::FatG, 5.0).with(Nutrient::Calories, 999.0),
        ];
        let merged = dedupe_by_name(items);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Latte");
        assert_eq!(merged[0].get(Nutrient::Calories), Some(200.0));
        assert_eq!(merged[0].get(Nutrient::FatG), Some(5.0));
        assert_eq!(merged[1].name, "Tea");
    }

    #[test]
    fn normalize_skips_empty_names_and_coerces() {
        let raw = RawTable {
            headers: vec!["name".into(), "Calories".into(), "Fat (g)".into()],
            rows: vec![
                vec![text("Mocha"), text("250"), text("-")],
                vec![text("   "), text("10"), text("1")],
                vec![text("mocha"), text(""), RawCell::Number(7.0)],
                vec![text("Tea")],
            ],
        };
        let mapping = ColumnMapping::from_headers(&raw.headers).unwrap();
        let (table, report) = normalize(&raw, &mapping);

        assert_eq!(report.rows_read, 4);
        assert_eq!(report.empty_names, 1);
        assert_eq!(report.duplicates_merged, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.items[0].get(Nutrient::Calories), Some(250.0));
        assert_eq!(table.items[0].get(Nutrient::FatG), Some(7.0));
        assert_eq!(table.items[1].get(Nutrient::Calories), None);
        assert!(table.source_columns.contains(&Nutrient::FatG));
        assert!(!table.source_columns.contains(&Nutrient::Sodium));
    }
}
