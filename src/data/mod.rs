/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │ encoding  │  first decoding encoding wins (CSV only)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  alias headers, coerce numbers, dedupe → MenuTable
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply nutrient predicates → filtered rows
///   └──────────┘
/// ```

pub mod columns;
pub mod encoding;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
