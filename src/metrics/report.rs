use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::compare::{compare_stats, Comparison};
use super::describe::{describe, Stats};
use super::extremes::{extremes, Extreme};
use super::rank::Ranking;
use crate::data::model::{MenuTable, Nutrient};

/// Top-N lists persisted alongside the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tops {
    pub drinks_top_calories: Ranking,
    pub drinks_top_sugar: Ranking,
    pub drinks_top_fat: Ranking,
    pub food_top_calories: Ranking,
    pub food_top_sugar: Ranking,
    pub food_top_fat: Ranking,
}

/// Everything the `stats` command writes and the narrator reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub drinks: Stats,
    pub food: Stats,
    pub comparisons: Comparison,
    pub tops: Tops,
    /// Highest calories, fat and carbs item per side.
    #[serde(default)]
    pub extremes: Vec<Extreme>,
}

impl MetricsReport {
    pub fn build(drinks: &MenuTable, food: &MenuTable, top_n: usize) -> Self {
        let drinks_stats = describe(drinks);
        let food_stats = describe(food);
        let comparisons = compare_stats(&drinks_stats, &food_stats);

        // Rank sugar by carbs when the table has no sugar values.
        let sugar_col = |t: &MenuTable| t.sugar_column().unwrap_or(Nutrient::CarbsG);

        let tops = Tops {
            drinks_top_calories: Ranking::build(drinks, Nutrient::Calories, top_n),
            drinks_top_sugar: Ranking::build(drinks, sugar_col(drinks), top_n),
            drinks_top_fat: Ranking::build(drinks, Nutrient::FatG, top_n),
            food_top_calories: Ranking::build(food, Nutrient::Calories, top_n),
            food_top_sugar: Ranking::build(food, sugar_col(food), top_n),
            food_top_fat: Ranking::build(food, Nutrient::FatG, top_n),
        };

        Self {
            drinks: drinks_stats,
            food: food_stats,
            comparisons,
            tops,
            extremes: extremes(drinks, food),
        }
    }

    /// Whether any sugar figure in the report is a carbs proxy.
    pub fn uses_sugar_proxy(&self) -> bool {
        self.drinks.sugar_proxy.is_some() || self.food.sugar_proxy.is_some()
    }
}

/// Write the report as pretty JSON, creating parent directories.
pub fn save_metrics(report: &MetricsReport, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    log::info!("saved metrics to {}", path.display());
    Ok(())
}

/// Read a report written by [`save_metrics`].
pub fn load_metrics(path: &Path) -> io::Result<MetricsReport> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MenuItem;

    fn sample() -> (MenuTable, MenuTable) {
        let drinks = MenuTable::from_items(vec![
            MenuItem::new("Mocha")
                .with(Nutrient::Calories, 250.0)
                .with(Nutrient::SugarG, 30.0),
            MenuItem::new("Tea").with(Nutrient::Calories, 5.0).with(Nutrient::SugarG, 0.0),
        ]);
        let food = MenuTable::from_items(vec![MenuItem::new("Bagel")
            .with(Nutrient::Calories, 280.0)
            .with(Nutrient::CarbsG, 56.0)
            .with(Nutrient::FatG, 1.5)]);
        (drinks, food)
    }

    #[test]
    fn report_ranks_sugar_by_proxy_column() {
        let (drinks, food) = sample();
        let report = MetricsReport::build(&drinks, &food, 10);
        assert_eq!(report.tops.drinks_top_sugar.column, Nutrient::SugarG);
        assert_eq!(report.tops.food_top_sugar.column, Nutrient::CarbsG);
        assert_eq!(report.tops.food_top_sugar.items[0].name, "Bagel");
        assert!(report.tops.drinks_top_fat.items.is_empty());
        assert!(report.uses_sugar_proxy());

        let carbs = &report.extremes[2];
        assert_eq!(carbs.nutrient, Nutrient::CarbsG);
        assert!(carbs.drinks.is_none());
        assert_eq!(carbs.food.as_ref().unwrap().name, "Bagel");
    }

    #[test]
    fn save_then_load_preserves_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics").join("metrics.json");
        let (drinks, food) = sample();
        let report = MetricsReport::build(&drinks, &food, 3);

        save_metrics(&report, &path).unwrap();
        assert_eq!(load_metrics(&path).unwrap(), report);
    }
}
