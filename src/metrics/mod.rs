//! Metrics engine: descriptive statistics, comparisons and rankings.
//!
//! Everything here reads a [`MenuTable`](crate::data::model::MenuTable)
//! and never fails: missing data shows up as absent fields.

pub mod compare;
pub mod describe;
pub mod extremes;
pub mod rank;
pub mod report;

pub use compare::{compare, compare_stats, Comparison};
pub use describe::{describe, ColumnStats, Stats};
pub use extremes::{extremes, Extreme};
pub use rank::{top_n, Ranking, DEFAULT_TOP_N};
pub use report::{load_metrics, save_metrics, MetricsReport};
