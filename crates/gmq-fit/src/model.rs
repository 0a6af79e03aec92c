use serde::{Deserialize, Serialize};

use gmq_core::errors::{ErrorInfo, GmqError, RecordFailure};
use gmq_core::ParticleRecord;
use gmq_quant::ExponentReport;

use crate::assignment::{Assignment, AssignmentMap};
use crate::design::{DesignBuilder, Feature, Target};
use crate::lstsq::{fit_least_squares, FitReport, LstsqOpts};

fn default_features() -> Vec<Feature> {
    vec![Feature::Dim, Feature::Weight]
}

fn default_assignments() -> AssignmentMap {
    AssignmentMap::code_modulo()
}

/// Declarative fit: columns, target, solver options and assignment source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSpec {
    /// Design columns.
    #[serde(default = "default_features")]
    pub features: Vec<Feature>,
    /// Regression target.
    #[serde(default)]
    pub target: Target,
    /// Solver options.
    #[serde(flatten)]
    pub solver: LstsqOpts,
    /// Assignment table and rules.
    #[serde(default = "default_assignments")]
    pub assignments: AssignmentMap,
}

impl Default for FitSpec {
    fn default() -> Self {
        Self {
            features: default_features(),
            target: Target::default(),
            solver: LstsqOpts::default(),
            assignments: default_assignments(),
        }
    }
}

/// Assignment used for one fitted sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedSample {
    /// Record name.
    pub name: String,
    /// Assigned label.
    pub assignment: Assignment,
}

/// Fit result plus the records that were left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOutcome {
    /// Solver output.
    pub report: FitReport,
    /// Assignments of the fitted samples, when the design used any.
    #[serde(default)]
    pub assignments: Vec<AssignedSample>,
    /// Records skipped while building the design.
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

/// Builds the design for `spec` and solves it.
pub fn run_fit(
    spec: &FitSpec,
    records: &[ParticleRecord],
    exponents: &ExponentReport,
) -> Result<FitOutcome, GmqError> {
    spec.assignments.validate()?;
    let builder = DesignBuilder::new(spec.features.clone(), spec.target.clone())?;
    let design = builder.build(records, exponents, &spec.assignments);
    if design.rows.is_empty() {
        return Err(GmqError::Fit(
            ErrorInfo::new("fit_no_samples", "no record produced a usable design row")
                .with_context("skipped", design.failures.len().to_string()),
        ));
    }
    let report = fit_least_squares(
        &design.sample_names,
        &design.feature_names,
        &design.rows,
        &design.targets,
        &spec.solver,
    )?;
    let assignments = design
        .sample_names
        .iter()
        .zip(&design.assignments)
        .filter_map(|(name, assignment)| {
            assignment.map(|assignment| AssignedSample {
                name: name.clone(),
                assignment,
            })
        })
        .collect();
    Ok(FitOutcome {
        report,
        assignments,
        failures: design.failures,
    })
}
