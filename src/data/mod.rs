/// Data layer: core types, loading, cleaning, filtering, and chart assembly.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → EarningsTable (canonical headers)
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ EarningsTable │  Vec<Record>, per-column distinct values
///   └───────────────┘
///        │
///        ├──▶ stats      missing counts, drop_incomplete, describe
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  equality constraints → filtered EarningsTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  group means, counts, partition, monthly trend
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ dashboard │  ColumnCaps-gated chart data (serializable)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dashboard;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
pub mod stats;
