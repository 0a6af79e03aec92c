#![deny(missing_docs)]
#![doc = "Brute-force decomposition of integer codes over the basis `[8, 15, 24]`."]

/// Coefficient pattern statistics.
pub mod patterns;
/// Batch decomposition reports.
pub mod report;
/// Box search and tie-break ordering.
pub mod search;

pub use patterns::{summarize, AxisStats, CoefficientSummary, CoefficientTotals};
pub use report::{decompose_all, DecompositionEntry, DecompositionReport};
pub use search::{
    compare_hits, decompose, AxisRange, BasisTriple, DecomposeOpts, Decomposition,
    DecompositionHit, SearchBox, SearchMode, DEFAULT_MAX_VOLUME,
};
