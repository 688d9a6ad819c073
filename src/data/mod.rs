/// Data layer: core types, loading, caching, filtering and lookup.
///
/// Architecture:
/// ```text
///  .parquet / .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate file → FundDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  Arc<FundDataset>, reloaded only when the file changes
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  categorical equality predicates → row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  lookup   │  symbol list, per-symbol metrics
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod lookup;
pub mod model;
