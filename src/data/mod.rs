/// Data layer: core types, loading, scoring and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate → Vec<CellRecord>
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ deviation  │  OLS fit + mean st → ScoredCell metrics
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  dev_st threshold → good / excluded, trim good
///   └──────────┘
/// ```

pub mod deviation;
pub mod filter;
pub mod loader;
pub mod model;
pub mod rank;
pub mod stats;
