/// Data layer: core types, feature derivation, loading, filtering, export.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawRecord rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  age group, efficiency, activity, quality, stress, disorder
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SleepDataset  │  Vec<SleepRecord>, cached once per process
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  equality constraints → FilteredView ──► export (CSV)
///   └──────────┘
/// ```
pub mod derive;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
