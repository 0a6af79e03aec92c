#![deny(missing_docs)]
#![doc = "Plan-driven analysis: quantize, decompose, fit and predict in one pass."]

/// Pipeline execution and artefact output.
pub mod pipeline;
/// Analysis plan schema and loading.
pub mod plan;
/// Combined analysis report.
pub mod report;

pub use pipeline::{load_plan_records, run_analysis, run_plan, run_plan_from_path};
pub use plan::{load_plan, AnalysisPlan, PredictionSpec, DEFAULT_FIT};
pub use report::{AnalysisReport, PredictionOutcome};
