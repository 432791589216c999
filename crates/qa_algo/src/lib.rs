// crates/qa_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure, synchronous algorithms over already-loaded inspection data.
//!
//! Pipeline order: classify → aggregate → (resolve limits) → decide.
//! Every function here is referentially transparent and never mutates its
//! inputs.

pub mod aql_table;
pub mod classify;
pub mod sizes;
pub mod tally;
pub mod verdict;

#[cfg(feature = "summaries")]
pub mod buyer;
#[cfg(feature = "summaries")]
pub mod heatmap;
#[cfg(feature = "summaries")]
pub mod measurement;

// Tight, explicit re-exports (avoid wildcard export drift).
pub use aql_table::{code_letter_for, normal_sample_size, resolve_limits};
pub use classify::{classify, classify_all, parse_severity, ClassifiedBatch};
pub use sizes::{sort_sizes, strip_fit_suffix};
pub use tally::{aggregate, aggregate_declared, GroupBy};
pub use verdict::decide;

#[cfg(feature = "summaries")]
pub use buyer::determine_buyer;
#[cfg(feature = "summaries")]
pub use heatmap::{inspector_summary, location_heatmap, InspectorRow, LocationHeatmap};
#[cfg(feature = "summaries")]
pub use measurement::{measurement_summary, MeasurementSummary, SizeMeasurementRow};
