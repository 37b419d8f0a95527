/// Data layer: core types, loading, and viewer filtering.
///
/// Architecture:
/// ```text
///  train / ideal / test  (.csv / .json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Frame (x + named columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ Dataset       │  TrainingSet, Catalog, ObservedPoint*
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  viewer visibility → shown selected pairs
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
