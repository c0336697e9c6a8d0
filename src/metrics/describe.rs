use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::model::{MenuTable, Nutrient};

// ---------------------------------------------------------------------------
// Per-column statistics
// ---------------------------------------------------------------------------

/// Statistics over the non-missing values of one column.
///
/// With `count == 0` every other field is `None`; consumers decide how to
/// show "no data".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
}

impl ColumnStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            count,
            mean: Some(sum / count as f64),
            median: Some(median),
            min: sorted.first().copied(),
            max: sorted.last().copied(),
            sum: Some(sum),
        }
    }
}

// ---------------------------------------------------------------------------
// Table statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Rows in the table.
    pub count: usize,
    /// One entry per nutrient, including entirely missing ones.
    pub columns: BTreeMap<Nutrient, ColumnStats>,
    /// mean(fat_g) / mean(protein_g).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_to_protein_ratio: Option<f64>,
    /// Column standing in for an entirely missing `sugar_g`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_proxy: Option<Nutrient>,
}

impl Stats {
    pub fn column(&self, nutrient: Nutrient) -> Option<&ColumnStats> {
        self.columns.get(&nutrient)
    }

    pub fn mean(&self, nutrient: Nutrient) -> Option<f64> {
        self.column(nutrient).and_then(|c| c.mean)
    }

    /// Sugar statistics, read from the proxy column when one is in use.
    pub fn sugar(&self) -> Option<&ColumnStats> {
        let column = self.sugar_proxy.unwrap_or(Nutrient::SugarG);
        self.column(column).filter(|c| c.count > 0)
    }
}

/// Compute statistics for every nutrient column of `table`.
pub fn describe(table: &MenuTable) -> Stats {
    let columns: BTreeMap<Nutrient, ColumnStats> = Nutrient::ALL
        .into_iter()
        .map(|n| (n, ColumnStats::from_values(&table.values(n))))
        .collect();

    let mean = |n: Nutrient| columns.get(&n).and_then(|c| c.mean);
    let fat_to_protein_ratio = match (mean(Nutrient::FatG), mean(Nutrient::ProteinG)) {
        (Some(fat), Some(protein)) if protein != 0.0 => Some(fat / protein),
        _ => None,
    };

    let sugar_proxy = (mean(Nutrient::SugarG).is_none() && mean(Nutrient::CarbsG).is_some())
        .then_some(Nutrient::CarbsG);
    if sugar_proxy.is_some() {
        log::debug!("sugar_g has no values; carbs_g stands in as sugar proxy");
    }

    Stats {
        count: table.len(),
        columns,
        fat_to_protein_ratio,
        sugar_proxy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MenuItem;

    #[test]
    fn column_stats_over_non_missing_values() {
        let stats = ColumnStats::from_values(&[250.0, 5.0]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, Some(127.5));
        assert_eq!(stats.median, Some(127.5));
        assert_eq!(stats.min, Some(5.0));
        assert_eq!(stats.max, Some(250.0));
        assert_eq!(stats.sum, Some(255.0));
    }

    #[test]
    fn odd_median_is_middle_value() {
        assert_eq!(ColumnStats::from_values(&[9.0, 1.0, 4.0]).median, Some(4.0));
    }

    #[test]
    fn empty_column_is_count_zero_and_undefined() {
        let table = MenuTable::from_items(vec![MenuItem::new("Tea").with(Nutrient::Calories, 5.0)]);
        let stats = describe(&table);
        let sodium = stats.column(Nutrient::Sodium).unwrap();
        assert_eq!(sodium.count, 0);
        assert_eq!(sodium.mean, None);
        assert_eq!(sodium.max, None);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["columns"]["sodium"], serde_json::json!({ "count": 0 }));
    }

    #[test]
    fn fat_to_protein_ratio_uses_means() {
        let table = MenuTable::from_items(vec![
            MenuItem::new("A").with(Nutrient::FatG, 5.0).with(Nutrient::ProteinG, 5.0),
            MenuItem::new("B").with(Nutrient::FatG, 10.0).with(Nutrient::ProteinG, 5.0),
        ]);
        assert_eq!(describe(&table).fat_to_protein_ratio, Some(1.5));
    }

    #[test]
    fn zero_protein_mean_has_no_ratio() {
        let table = MenuTable::from_items(vec![
            MenuItem::new("Water").with(Nutrient::FatG, 0.0).with(Nutrient::ProteinG, 0.0),
        ]);
        assert_eq!(describe(&table).fat_to_protein_ratio, None);
    }

    #[test]
    fn sugar_proxy_flags_carbs() {
        let table = MenuTable::from_items(vec![MenuItem::new("Scone").with(Nutrient::CarbsG, 60.0)]);
        let stats = describe(&table);
        assert_eq!(stats.sugar_proxy, Some(Nutrient::CarbsG));
        assert_eq!(stats.sugar().and_then(|s| s.mean), Some(60.0));
    }

    #[test]
    fn partial_sugar_is_missing_data_not_a_proxy() {
        let table = MenuTable::from_items(vec![
            MenuItem::new("Mocha").with(Nutrient::SugarG, 30.0).with(Nutrient::CarbsG, 35.0),
            MenuItem::new("Scone").with(Nutrient::CarbsG, 60.0),
        ]);
        let stats = describe(&table);
        assert_eq!(stats.sugar_proxy, None);
        let sugar = stats.sugar().unwrap();
        assert_eq!(sugar.count, 1);
        assert_eq!(sugar.mean, Some(30.0));
    }
}
