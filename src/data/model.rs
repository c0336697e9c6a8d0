use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::columns;
use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Nutrient – one recognized numeric column
// ---------------------------------------------------------------------------

/// The closed set of nutrient columns a menu table can carry.
///
/// Declaration order is the canonical column order used for output, charts
/// and tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    FatG,
    CarbsG,
    FiberG,
    ProteinG,
    SugarG,
    Sodium,
    Caffeine,
}

impl Nutrient {
    pub const ALL: [Nutrient; 8] = [
        Nutrient::Calories,
        Nutrient::FatG,
        Nutrient::CarbsG,
        Nutrient::FiberG,
        Nutrient::ProteinG,
        Nutrient::SugarG,
        Nutrient::Sodium,
        Nutrient::Caffeine,
    ];

    /// Canonical snake_case key, identical to the serialized form.
    pub fn key(self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::FatG => "fat_g",
            Nutrient::CarbsG => "carbs_g",
            Nutrient::FiberG => "fiber_g",
            Nutrient::ProteinG => "protein_g",
            Nutrient::SugarG => "sugar_g",
            Nutrient::Sodium => "sodium",
            Nutrient::Caffeine => "caffeine",
        }
    }

    /// Human label for chart axes and UI headers.
    pub fn label(self) -> &'static str {
        match self {
            Nutrient::Calories => "Calories",
            Nutrient::FatG => "Fat (g)",
            Nutrient::CarbsG => "Carbs (g)",
            Nutrient::FiberG => "Fiber (g)",
            Nutrient::ProteinG => "Protein (g)",
            Nutrient::SugarG => "Sugar (g)",
            Nutrient::Sodium => "Sodium",
            Nutrient::Caffeine => "Caffeine",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Nutrient {
    type Err = ValidationError;

    /// Accepts canonical keys and every raw header alias the loader knows.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match columns::resolve_header(s) {
            Some(columns::ColumnRole::Nutrient(n)) => Ok(n),
            _ => Err(ValidationError::UnknownColumn(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// MenuItem – one normalized row
// ---------------------------------------------------------------------------

/// A single menu entry after header aliasing and numeric coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuItem {
    pub name: String,
    values: [Option<f64>; 8],
}

impl MenuItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: [None; 8],
        }
    }

    /// Builder-style setter, handy for fixtures.
    pub fn with(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.set(nutrient, Some(value));
        self
    }

    pub fn get(&self, nutrient: Nutrient) -> Option<f64> {
        self.values[nutrient.index()]
    }

    pub fn set(&mut self, nutrient: Nutrient, value: Option<f64>) {
        self.values[nutrient.index()] = value;
    }

    /// Lowercased name used as the deduplication key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Whether every nutrient is missing.
    pub fn is_sparse(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Whether at least one nutrient is missing.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(Option::is_none)
    }
}

// ---------------------------------------------------------------------------
// MenuTable – the complete normalized dataset
// ---------------------------------------------------------------------------

/// An ordered, deduplicated sequence of menu items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuTable {
    /// All items (rows), in source order.
    pub items: Vec<MenuItem>,
    /// Nutrients the source file supplied a column for.
    pub source_columns: BTreeSet<Nutrient>,
    /// Name of the text encoding that decoded the file, when one was needed.
    pub encoding: Option<String>,
}

impl MenuTable {
    pub fn from_items(items: Vec<MenuItem>) -> Self {
        let source_columns = Nutrient::ALL
            .into_iter()
            .filter(|&n| items.iter().any(|it| it.get(n).is_some()))
            .collect();
        Self {
            items,
            source_columns,
            encoding: None,
        }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Non-missing values of one column, in table order.
    pub fn values(&self, nutrient: Nutrient) -> Vec<f64> {
        self.items.iter().filter_map(|it| it.get(nutrient)).collect()
    }

    /// Whether the column has at least one non-missing value.
    pub fn has_data(&self, nutrient: Nutrient) -> bool {
        self.items.iter().any(|it| it.get(nutrient).is_some())
    }

    /// Column standing in for sugar: `sugar_g` when it has data, else
    /// `carbs_g` when that has data.
    pub fn sugar_column(&self) -> Option<Nutrient> {
        if self.has_data(Nutrient::SugarG) {
            Some(Nutrient::SugarG)
        } else if self.has_data(Nutrient::CarbsG) {
            Some(Nutrient::CarbsG)
        } else {
            None
        }
    }

    /// The column to read for `nutrient`: carbs stand in for sugar when
    /// the table has no sugar values.
    pub fn resolve_column(&self, nutrient: Nutrient) -> Nutrient {
        if nutrient == Nutrient::SugarG {
            self.sugar_column().unwrap_or(Nutrient::SugarG)
        } else {
            nutrient
        }
    }

    /// Exact, case-insensitive lookup by name.
    pub fn get_item(&self, name: &str) -> Option<&MenuItem> {
        let wanted = name.trim().to_lowercase();
        self.items.iter().find(|it| it.key() == wanted)
    }

    /// Keep only the rows at `indices`, preserving metadata.
    pub fn select(&self, indices: &[usize]) -> MenuTable {
        MenuTable {
            items: indices.iter().map(|&i| self.items[i].clone()).collect(),
            source_columns: self.source_columns.clone(),
            encoding: self.encoding.clone(),
        }
    }
}
