use std::fmt;
use std::str::FromStr;

use super::model::{MenuItem, MenuTable, Nutrient};
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Predicates: AND-composed row tests
// ---------------------------------------------------------------------------

/// One row test. A row with a missing value fails every numeric predicate,
/// so a predicate on a column that is missing everywhere excludes all rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// value ≤ threshold
    AtMost(Nutrient, f64),
    /// value ≥ threshold
    AtLeast(Nutrient, f64),
    /// value > threshold
    Above(Nutrient, f64),
    /// case-insensitive substring of the item name
    NameContains(String),
}

impl Predicate {
    fn nutrient(&self) -> Option<Nutrient> {
        match self {
            Predicate::AtMost(n, _) | Predicate::AtLeast(n, _) | Predicate::Above(n, _) => Some(*n),
            Predicate::NameContains(_) => None,
        }
    }

    /// Rebind a `sugar_g` predicate to `carbs_g` when the table has no sugar data.
    fn resolve(&self, table: &MenuTable) -> Predicate {
        if self.nutrient() != Some(Nutrient::SugarG) || table.has_data(Nutrient::SugarG) {
            return self.clone();
        }
        if !table.has_data(Nutrient::CarbsG) {
            return self.clone();
        }
        log::info!("sugar_g missing from table; filtering on carbs_g as a proxy");
        match self {
            Predicate::AtMost(_, x) => Predicate::AtMost(Nutrient::CarbsG, *x),
            Predicate::AtLeast(_, x) => Predicate::AtLeast(Nutrient::CarbsG, *x),
            Predicate::Above(_, x) => Predicate::Above(Nutrient::CarbsG, *x),
            other => other.clone(),
        }
    }

    /// Test a single item.
    pub fn matches(&self, item: &MenuItem) -> bool {
        match self {
            Predicate::AtMost(n, x) => item.get(*n).is_some_and(|v| v <= *x),
            Predicate::AtLeast(n, x) => item.get(*n).is_some_and(|v| v >= *x),
            Predicate::Above(n, x) => item.get(*n).is_some_and(|v| v > *x),
            Predicate::NameContains(needle) => item
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::AtMost(n, x) => write!(f, "{n}<={x}"),
            Predicate::AtLeast(n, x) => write!(f, "{n}>={x}"),
            Predicate::Above(n, x) => write!(f, "{n}>{x}"),
            Predicate::NameContains(s) => write!(f, "name~{s}"),
        }
    }
}

impl FromStr for Predicate {
    type Err = ValidationError;

    /// Parse `calories<=200`, `protein_g>=5`, `caffeine>0` or `name~latte`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((lhs, rhs)) = s.split_once('~') {
            let column = lhs.trim();
            if !column.eq_ignore_ascii_case("name") && !column.eq_ignore_ascii_case("item_name") {
                return Err(ValidationError::UnknownColumn(column.to_string()));
            }
            let needle = rhs.trim();
            if needle.is_empty() {
                return Err(ValidationError::MalformedPredicate(s.to_string()));
            }
            return Ok(Predicate::NameContains(needle.to_string()));
        }

        // Two-character operators first so `>=` is not read as `>`.
        let (lhs, op, rhs) = ["<=", ">=", ">"]
            .iter()
            .find_map(|op| s.split_once(op).map(|(l, r)| (l, *op, r)))
            .ok_or_else(|| ValidationError::MalformedPredicate(s.to_string()))?;

        let nutrient: Nutrient = lhs.trim().parse()?;
        let value = parse_threshold(nutrient, rhs)?;
        Ok(match op {
            "<=" => Predicate::AtMost(nutrient, value),
            ">=" => Predicate::AtLeast(nutrient, value),
            _ => Predicate::Above(nutrient, value),
        })
    }
}

fn parse_threshold(nutrient: Nutrient, raw: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::InvalidThreshold {
            column: nutrient.key().to_string(),
            value: raw.trim().to_string(),
        })
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Return indices of items that pass all predicates. Empty `predicates`
/// selects every row.
pub fn filtered_indices(table: &MenuTable, predicates: &[Predicate]) -> Vec<usize> {
    let resolved: Vec<Predicate> = predicates.iter().map(|p| p.resolve(table)).collect();
    for p in &resolved {
        if let Some(n) = p.nutrient() {
            if !table.has_data(n) {
                log::warn!("filter {p} references {n}, which has no values; no rows can match");
            }
        }
    }
    table
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| resolved.iter().all(|p| p.matches(item)))
        .map(|(i, _)| i)
        .collect()
}

/// Order-preserving subsequence of `table` satisfying every predicate.
pub fn filter(table: &MenuTable, predicates: &[Predicate]) -> MenuTable {
    if predicates.is_empty() {
        return table.clone();
    }
    table.select(&filtered_indices(table, predicates))
}

// ---------------------------------------------------------------------------
// Criteria: the flag-shaped front end used by the CLI and viewer
// ---------------------------------------------------------------------------

/// Optional thresholds; unset fields add no predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub calories_le: Option<f64>,
    pub sugar_g_le: Option<f64>,
    pub fat_g_le: Option<f64>,
    pub protein_g_ge: Option<f64>,
    pub sodium_le: Option<f64>,
    pub caffeine_gt: Option<f64>,
    pub name_contains: Option<String>,
}

impl FilterCriteria {
    pub fn to_predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::new();
        if let Some(x) = self.calories_le {
            out.push(Predicate::AtMost(Nutrient::Calories, x));
        }
        if let Some(x) = self.sugar_g_le {
            out.push(Predicate::AtMost(Nutrient::SugarG, x));
        }
        if let Some(x) = self.fat_g_le {
            out.push(Predicate::AtMost(Nutrient::FatG, x));
        }
        if let Some(x) = self.protein_g_ge {
            out.push(Predicate::AtLeast(Nutrient::ProteinG, x));
        }
        if let Some(x) = self.sodium_le {
            out.push(Predicate::AtMost(Nutrient::Sodium, x));
        }
        if let Some(x) = self.caffeine_gt {
            out.push(Predicate::Above(Nutrient::Caffeine, x));
        }
        if let Some(s) = self.name_contains.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push(Predicate::NameContains(s.trim().to_string()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drinks() -> MenuTable {
        MenuTable::from_items(vec![
            MenuItem::new("Caffè Latte").with(Nutrient::Calories, 190.0).with(Nutrient::ProteinG, 13.0),
            MenuItem::new("Iced Latte").with(Nutrient::Calories, 130.0).with(Nutrient::ProteinG, 8.0),
            MenuItem::new("Mocha").with(Nutrient::Calories, 250.0).with(Nutrient::ProteinG, 10.0),
            MenuItem::new("Latte Macchiato").with(Nutrient::Calories, 210.0),
            MenuItem::new("Brewed Tea").with(Nutrient::CarbsG, 0.0),
        ])
    }

    #[test]
    fn and_composition_keeps_rows_meeting_every_predicate() {
        let table = drinks();
        let preds = vec![
            Predicate::AtMost(Nutrient::Calories, 200.0),
            Predicate::NameContains("latte".into()),
        ];
        let out = filter(&table, &preds);
        let names: Vec<&str> = out.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Caffè Latte", "Iced Latte"]);
    }

    #[test]
    fn no_predicates_is_identity() {
        let table = drinks();
        assert_eq!(filter(&table, &[]), table);
    }

    #[test]
    fn missing_values_fail_numeric_predicates() {
        let table = drinks();
        let idx = filtered_indices(&table, &[Predicate::AtLeast(Nutrient::ProteinG, 0.0)]);
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn entirely_missing_column_excludes_everything() {
        let table = drinks();
        assert!(filter(&table, &[Predicate::Above(Nutrient::Caffeine, 0.0)]).is_empty());
        assert!(filter(&table, &[Predicate::AtMost(Nutrient::Sodium, 1e9)]).is_empty());
    }

    #[test]
    fn sugar_predicate_uses_carbs_when_sugar_absent() {
        let table = drinks();
        let out = filter(&table, &[Predicate::AtMost(Nutrient::SugarG, 5.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out.items[0].name, "Brewed Tea");
    }

    #[test]
    fn parses_predicates() {
        assert_eq!(
            "calories<=200".parse::<Predicate>().unwrap(),
            Predicate::AtMost(Nutrient::Calories, 200.0)
        );
        assert_eq!(
            " protein_g >= 5 ".parse::<Predicate>().unwrap(),
            Predicate::AtLeast(Nutrient::ProteinG, 5.0)
        );
        assert_eq!(
            "caffeine_mg>0".parse::<Predicate>().unwrap(),
            Predicate::Above(Nutrient::Caffeine, 0.0)
        );
        assert_eq!(
            "name~Latte".parse::<Predicate>().unwrap(),
            Predicate::NameContains("Latte".into())
        );
    }

    #[test]
    fn rejects_bad_predicates() {
        assert_eq!(
            "colour<=3".parse::<Predicate>(),
            Err(ValidationError::UnknownColumn("colour".into()))
        );
        assert!(matches!(
            "calories<=lots".parse::<Predicate>(),
            Err(ValidationError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            "calories=3".parse::<Predicate>(),
            Err(ValidationError::MalformedPredicate(_))
        ));
    }

    #[test]
    fn criteria_build_predicates_in_flag_order() {
        let criteria = FilterCriteria {
            calories_le: Some(300.0),
            protein_g_ge: Some(5.0),
            name_contains: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(
            criteria.to_predicates(),
            vec![
                Predicate::AtMost(Nutrient::Calories, 300.0),
                Predicate::AtLeast(Nutrient::ProteinG, 5.0),
            ]
        );
    }

    #[test]
    fn partial_sugar_column_is_not_rebound_to_carbs() {
        let table = MenuTable::from_items(vec![
            MenuItem::new("Mocha").with(Nutrient::SugarG, 30.0).with(Nutrient::CarbsG, 35.0),
            MenuItem::new("Scone").with(Nutrient::CarbsG, 10.0),
        ]);
        let pred = Predicate::AtMost(Nutrient::SugarG, 40.0);
        assert_eq!(pred.resolve(&table), pred);

        // Scone has no sugar value, so it fails even though its carbs pass.
        let out = filter(&table, &[pred]);
        let names: Vec<&str> = out.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Mocha"]);
    }
}
