use serde::{Deserialize, Serialize};

use super::rank::{top_n, RankedItem};
use crate::data::model::{MenuTable, Nutrient};

/// Nutrients whose single highest item is reported per dataset.
pub const EXTREME_NUTRIENTS: [Nutrient; 3] = [Nutrient::Calories, Nutrient::FatG, Nutrient::CarbsG];

/// The highest item of one nutrient on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extreme {
    pub nutrient: Nutrient,
    pub drinks: Option<RankedItem>,
    pub food: Option<RankedItem>,
}

impl Extreme {
    /// Chart and grid label, e.g. "Highest Fat".
    pub fn label(&self) -> String {
        format!("Highest {}", short_label(self.nutrient))
    }
}

fn short_label(nutrient: Nutrient) -> &'static str {
    match nutrient {
        Nutrient::Calories => "Calories",
        Nutrient::FatG => "Fat",
        Nutrient::CarbsG => "Carbs",
        Nutrient::FiberG => "Fiber",
        Nutrient::ProteinG => "Protein",
        Nutrient::SugarG => "Sugar",
        Nutrient::Sodium => "Sodium",
        Nutrient::Caffeine => "Caffeine",
    }
}

/// First item holding the maximum of `nutrient`, if any row has a value.
pub fn highest(table: &MenuTable, nutrient: Nutrient) -> Option<RankedItem> {
    let item = top_n(table, nutrient, 1).into_iter().next()?;
    Some(RankedItem {
        value: item.get(nutrient)?,
        name: item.name,
    })
}

/// Highest calories, fat and carbs item for drinks and food.
pub fn extremes(drinks: &MenuTable, food: &MenuTable) -> Vec<Extreme> {
    EXTREME_NUTRIENTS
        .iter()
        .map(|&nutrient| Extreme {
            nutrient,
            drinks: highest(drinks, nutrient),
            food: highest(food, nutrient),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MenuItem;

    #[test]
    fn picks_the_first_maximum_per_side() {
        let drinks = MenuTable::from_items(vec![
            MenuItem::new("Mocha").with(Nutrient::Calories, 250.0).with(Nutrient::FatG, 9.0),
            MenuItem::new("Frappuccino").with(Nutrient::Calories, 410.0),
            MenuItem::new("Chai").with(Nutrient::Calories, 410.0).with(Nutrient::FatG, 4.0),
        ]);
        let food = MenuTable::from_items(vec![MenuItem::new("Bagel")
            .with(Nutrient::Calories, 280.0)
            .with(Nutrient::CarbsG, 56.0)]);

        let found = extremes(&drinks, &food);
        assert_eq!(found.len(), 3);

        let calories = &found[0];
        assert_eq!(calories.label(), "Highest Calories");
        assert_eq!(calories.drinks.as_ref().unwrap().name, "Frappuccino");
        assert_eq!(calories.food.as_ref().unwrap().value, 280.0);

        let fat = &found[1];
        assert_eq!(fat.drinks.as_ref().unwrap().name, "Mocha");
        assert!(fat.food.is_none());

        let carbs = &found[2];
        assert!(carbs.drinks.is_none());
        assert_eq!(carbs.food.as_ref().unwrap().name, "Bagel");
    }

    #[test]
    fn empty_table_has_no_extremes() {
        let empty = MenuTable::from_items(Vec::new());
        assert!(highest(&empty, Nutrient::Calories).is_none());
    }
}
