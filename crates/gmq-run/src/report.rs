use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use gmq_core::errors::RecordFailure;
use gmq_core::{ReferenceScale, RunProvenance, SchemaVersion};
use gmq_decomp::{CoefficientSummary, DecompositionReport};
use gmq_fit::FitOutcome;
use gmq_predict::{BestAssignment, LatticeReport, NearestStates, PredictionTable};
use gmq_quant::{ExponentReport, QuantDiagnostics};

/// Predictor output for the plan's prediction stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    /// Fit the model was read from.
    pub fit: String,
    /// Predicted states.
    pub table: PredictionTable,
    /// Closest states per record.
    pub nearest: Vec<NearestStates>,
    /// Best state per record.
    pub best: Vec<BestAssignment>,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Hashes, reference and timestamp.
    pub provenance: RunProvenance,
    /// Quantized exponents.
    pub exponents: ExponentReport,
    /// Grid statistics.
    pub diagnostics: QuantDiagnostics,
    /// Basis decompositions.
    pub decompositions: DecompositionReport,
    /// Coefficient patterns of the preferred triples.
    pub patterns: CoefficientSummary,
    /// Fits that succeeded, by name.
    pub fits: BTreeMap<String, FitOutcome>,
    /// Prediction stage, when enabled and its fit succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionOutcome>,
    /// Lattice stage, when enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lattice: Option<LatticeReport>,
    /// Failures from every stage, in stage order.
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

impl AnalysisReport {
    /// Failures raised by one stage.
    pub fn failures_in(&self, stage: &str) -> impl Iterator<Item = &RecordFailure> + '_ {
        let stage = stage.to_string();
        self.failures.iter().filter(move |failure| failure.stage == stage)
    }
}

pub(crate) fn provenance(
    input_hash: String,
    plan_hash: String,
    reference: &ReferenceScale,
) -> RunProvenance {
    let mut versions = BTreeMap::new();
    versions.insert("gmq-run".to_string(), env!("CARGO_PKG_VERSION").to_string());
    RunProvenance {
        schema_version: SchemaVersion::default(),
        input_hash,
        plan_hash,
        reference_name: reference.name.clone(),
        reference_mass: reference.mass,
        created_at: Utc::now().to_rfc3339(),
        tool_versions: versions,
    }
}
