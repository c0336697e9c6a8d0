//! Header aliasing: raw column labels → canonical roles.
//!
//! Source files disagree on header spelling (`Fat (g)`, `fat_g`, `Fat`).
//! Every label is reduced to a lookup key (lowercase ASCII alphanumerics
//! only) and matched against a static alias table.

use super::model::Nutrient;

/// What a raw column means once recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Name,
    Nutrient(Nutrient),
}

const NAME_ALIASES: &[&str] = &["itemname", "item", "name", "beverage", "product", "menuitem"];

const NUTRIENT_ALIASES: &[(Nutrient, &[&str])] = &[
    (Nutrient::Calories, &["calories", "calorie", "kcal", "energykcal"]),
    (Nutrient::FatG, &["fatg", "fat", "totalfatg", "totalfat"]),
    (
        Nutrient::CarbsG,
        &[
            "carbg",
            "carbsg",
            "carb",
            "carbs",
            "carbohydrateg",
            "carbohydratesg",
            "carbohydrates",
            "totalcarbohydratesg",
            "totalcarbsg",
        ],
    ),
    (Nutrient::FiberG, &[
            "fiberg",
            "fiber",
            "fibreg",
            "fibre",
            "dietaryfiberg",
            "dietaryfibreg",
            "dietaryfiber",
            "dietaryfibre",
        ]),
    (Nutrient::ProteinG, &["proteing", "protein"]),
    (Nutrient::SugarG, &["sugarg", "sugar", "sugarsg", "sugars"]),
    (Nutrient::Sodium, &["sodium", "sodiummg", "sodiumg"]),
    (Nutrient::Caffeine, &["caffeine", "caffeinemg"]),
];

/// Reduce a header to its lookup key.
pub fn header_key(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolve a raw header to a role, or `None` when unrecognized.
pub fn resolve_header(raw: &str) -> Option<ColumnRole> {
    let key = header_key(raw);
    if key.is_empty() {
        return None;
    }
    if NAME_ALIASES.contains(&key.as_str()) {
        return Some(ColumnRole::Name);
    }
    NUTRIENT_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&key.as_str()))
        .map(|(n, _)| ColumnRole::Nutrient(*n))
}

/// Column layout of one source file after aliasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Index of the name column.
    pub name: usize,
    /// Source index for each recognized nutrient, in header order.
    pub nutrients: Vec<(Nutrient, usize)>,
    /// Headers that matched nothing.
    pub dropped: Vec<String>,
}

impl ColumnMapping {
    /// Map a header row. Returns `None` when no name column can be found.
    ///
    /// When no header matches a name alias and the first header is blank,
    /// the first column holds the names (the published menu CSVs ship an
    /// unlabelled leading column).
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Option<Self> {
        let mut name = None;
        let mut nutrients: Vec<(Nutrient, usize)> = Vec::new();
        let mut dropped = Vec::new();

        for (idx, header) in headers.iter().enumerate() {
            let header = header.as_ref();
            match resolve_header(header) {
                Some(ColumnRole::Name) if name.is_none() => name = Some(idx),
                Some(ColumnRole::Nutrient(n)) => {
                    if nutrients.iter().any(|(seen, _)| *seen == n) {
                        log::warn!("column '{header}' duplicates {n}; keeping the first");
                    } else {
                        nutrients.push((n, idx));
                    }
                }
                _ if idx == 0 && header_key(header).is_empty() => {}
                _ => dropped.push(header.to_string()),
            }
        }

        let name = match name {
            Some(idx) => idx,
            None if headers
                .first()
                .is_some_and(|h| header_key(h.as_ref()).is_empty()) =>
            {
                0
            }
            None => return None,
        };

        if !dropped.is_empty() {
            log::debug!("ignoring unrecognized columns: {dropped:?}");
        }

        Some(Self {
            name,
            nutrients,
            dropped,
        })
    }
}
