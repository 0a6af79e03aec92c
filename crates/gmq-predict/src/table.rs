use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use gmq_core::errors::{ErrorInfo, GmqError};
use gmq_core::ReferenceScale;
use gmq_quant::quantize::{check_reference, mass_for_exponent, STEPS_PER_UNIT};

use crate::model::StateModel;
use crate::states::StateSpace;

fn default_min_mass() -> f64 {
    1e-20
}

fn default_max_mass() -> f64 {
    1e20
}

/// Inclusive mass filter in GeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassWindow {
    /// Smallest kept mass.
    #[serde(default = "default_min_mass")]
    pub min_mass: f64,
    /// Largest kept mass.
    #[serde(default = "default_max_mass")]
    pub max_mass: f64,
}

impl Default for MassWindow {
    fn default() -> Self {
        Self {
            min_mass: default_min_mass(),
            max_mass: default_max_mass(),
        }
    }
}

impl MassWindow {
    /// Creates a window.
    pub const fn new(min_mass: f64, max_mass: f64) -> Self {
        Self { min_mass, max_mass }
    }

    /// Rejects NaN bounds and inverted windows.
    pub fn validate(&self) -> Result<(), GmqError> {
        if self.min_mass.is_nan() || self.max_mass.is_nan() || self.min_mass > self.max_mass {
            return Err(GmqError::Config(
                ErrorInfo::new("predict_window", "mass window must satisfy min_mass <= max_mass")
                    .with_context("min_mass", self.min_mass.to_string())
                    .with_context("max_mass", self.max_mass.to_string()),
            ));
        }
        Ok(())
    }

    /// Returns true when `mass` lies in the window.
    pub fn contains(&self, mass: f64) -> bool {
        self.min_mass <= mass && mass <= self.max_mass
    }
}

/// Predicted state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// Group label.
    pub label: String,
    /// Representation dimension.
    pub dim: u8,
    /// Weight.
    pub weight: i64,
    /// Predicted exponent `n`.
    pub exponent: f64,
    /// `4n`, not rounded.
    pub code: f64,
    /// `reference * phi^n`.
    pub mass: f64,
}

/// Predicted states ordered by mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionTable {
    /// Model the rows were computed from.
    pub model: StateModel,
    /// Reference scale.
    pub reference: ReferenceScale,
    /// Filter that was applied.
    pub window: MassWindow,
    /// Kept rows.
    pub rows: Vec<PredictionRow>,
    /// States whose mass was not finite.
    pub dropped_non_finite: usize,
    /// States outside the window.
    pub dropped_out_of_window: usize,
}

impl PredictionTable {
    /// Row for a `(dim, weight)` pair.
    pub fn row(&self, dim: u8, weight: i64) -> Option<&PredictionRow> {
        self.rows
            .iter()
            .find(|row| row.dim == dim && row.weight == weight)
    }
}

fn compare_rows(lhs: &PredictionRow, rhs: &PredictionRow) -> Ordering {
    lhs.mass
        .total_cmp(&rhs.mass)
        .then_with(|| lhs.label.cmp(&rhs.label))
        .then_with(|| lhs.dim.cmp(&rhs.dim))
        .then_with(|| lhs.weight.cmp(&rhs.weight))
}

/// Evaluates the model on every state. Non-finite and out-of-window masses
/// are dropped and counted; the rest are sorted by mass.
pub fn predict(
    model: &StateModel,
    space: &StateSpace,
    reference: &ReferenceScale,
    window: &MassWindow,
) -> Result<PredictionTable, GmqError> {
    check_reference(reference)?;
    window.validate()?;
    let mut table = PredictionTable {
        model: *model,
        reference: reference.clone(),
        window: *window,
        rows: Vec::new(),
        dropped_non_finite: 0,
        dropped_out_of_window: 0,
    };
    for state in space.states()? {
        let exponent = model.exponent(&state.assignment);
        let mass = mass_for_exponent(exponent, reference);
        if !mass.is_finite() {
            table.dropped_non_finite += 1;
            continue;
        }
        if !window.contains(mass) {
            table.dropped_out_of_window += 1;
            continue;
        }
        table.rows.push(PredictionRow {
            label: state.label,
            dim: state.assignment.dim,
            weight: state.assignment.weight,
            exponent,
            code: exponent * STEPS_PER_UNIT,
            mass,
        });
    }
    table.rows.sort_by(compare_rows);
    Ok(table)
}
