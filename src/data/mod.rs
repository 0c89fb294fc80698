/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .dat
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, normalise header, sort → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  named columns, ordered rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  row/column predicates → new Table
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
