//! Menu nutrition analysis: load menu tables, compute statistics and
//! comparisons, filter rows, draw charts and narrate the results.

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod narrate;
pub mod viewer;

pub use data::filter::{filter, FilterCriteria, Predicate};
pub use data::loader::load;
pub use data::model::{MenuItem, MenuTable, Nutrient};
pub use metrics::{compare, describe, top_n, MetricsReport};
