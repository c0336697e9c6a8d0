use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::describe::{describe, Stats};
use crate::data::model::{MenuTable, Nutrient};

/// Means of one metric on both sides, `difference = a - b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanDifference {
    pub a: f64,
    pub b: f64,
    pub difference: f64,
}

impl MeanDifference {
    fn new(a: f64, b: f64) -> Self {
        Self {
            a,
            b,
            difference: a - b,
        }
    }
}

/// Sugar means with explicit proxy flags per side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SugarComparison {
    pub a: f64,
    pub b: f64,
    pub difference: f64,
    /// `a` is the carbs mean because table A has no sugar values.
    pub a_proxy: bool,
    /// `b` is the carbs mean because table B has no sugar values.
    pub b_proxy: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioComparison {
    pub a: f64,
    pub b: f64,
    pub difference: f64,
    /// Difference relative to `b`, in percent. Absent when `b` is zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LargestDifference {
    pub metric: Nutrient,
    pub abs_difference: f64,
}

/// Cross-table comparison, A minus B. Metrics that cannot be computed are
/// absent rather than zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Comparison {
    /// Nutrients with a mean on both sides.
    pub nutrients: BTreeMap<Nutrient, MeanDifference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<SugarComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_to_protein: Option<RatioComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_to_protein_a_only: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat_to_protein_b_only: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub largest_difference: Option<LargestDifference>,
}

impl Comparison {
    /// Whether either side's sugar figure is really carbs.
    pub fn uses_sugar_proxy(&self) -> bool {
        self.sugar.is_some_and(|s| s.a_proxy || s.b_proxy)
    }
}

/// Compare two tables (canonically drinks vs food).
pub fn compare(a: &MenuTable, b: &MenuTable) -> Comparison {
    compare_stats(&describe(a), &describe(b))
}

/// Compare two precomputed [`Stats`].
pub fn compare_stats(a: &Stats, b: &Stats) -> Comparison {
    let nutrients: BTreeMap<Nutrient, MeanDifference> = Nutrient::ALL
        .into_iter()
        .filter_map(|n| Some((n, MeanDifference::new(a.mean(n)?, b.mean(n)?))))
        .collect();

    let sugar = match (a.sugar().and_then(|s| s.mean), b.sugar().and_then(|s| s.mean)) {
        (Some(sa), Some(sb)) => Some(SugarComparison {
            a: sa,
            b: sb,
            difference: sa - sb,
            a_proxy: a.sugar_proxy.is_some(),
            b_proxy: b.sugar_proxy.is_some(),
        }),
        _ => None,
    };

    let mut out = Comparison {
        sugar,
        ..Default::default()
    };

    match (a.fat_to_protein_ratio, b.fat_to_protein_ratio) {
        (Some(ra), Some(rb)) => {
            out.fat_to_protein = Some(RatioComparison {
                a: ra,
                b: rb,
                difference: ra - rb,
                difference_pct: (rb != 0.0).then(|| (ra - rb) / rb * 100.0),
            });
        }
        (Some(ra), None) => out.fat_to_protein_a_only = Some(ra),
        (None, Some(rb)) => out.fat_to_protein_b_only = Some(rb),
        (None, None) => {}
    }

    // Strictly greater keeps the first nutrient in canonical order on ties.
    out.largest_difference = nutrients.iter().fold(None, |best: Option<LargestDifference>, (n, d)| {
        let abs = d.difference.abs();
        match best {
            Some(b) if b.abs_difference >= abs => Some(b),
            _ => Some(LargestDifference {
                metric: *n,
                abs_difference: abs,
            }),
        }
    });

    out.nutrients = nutrients;
    out
}
