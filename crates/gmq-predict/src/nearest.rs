use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use gmq_core::errors::{config_error, GmqError};
use gmq_quant::ExponentReport;

use crate::model::StateModel;
use crate::states::StateSpace;
use crate::table::PredictionTable;

fn default_radius() -> f64 {
    5.0
}

fn default_k() -> usize {
    3
}

/// Bounds for [`nearest_states`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestOpts {
    /// Keep states with `|n_state - n_record| < radius`.
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// States kept per record.
    #[serde(default = "default_k")]
    pub k: usize,
}

impl Default for NearestOpts {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            k: default_k(),
        }
    }
}

/// A predicted state close to a known record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMatch {
    /// Group label.
    pub label: String,
    /// Representation dimension.
    pub dim: u8,
    /// Weight.
    pub weight: i64,
    /// Predicted exponent.
    pub exponent: f64,
    /// `|exponent - n_quantized|`.
    pub distance: f64,
}

/// Closest predicted states for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestStates {
    /// Record name.
    pub name: String,
    /// Quantized exponent of the record.
    pub n_quantized: f64,
    /// Closest first.
    pub matches: Vec<StateMatch>,
}

/// For each quantized record, the table rows within `radius`, closest first,
/// at most `k` of them.
pub fn nearest_states(
    table: &PredictionTable,
    exponents: &ExponentReport,
    opts: &NearestOpts,
) -> Result<Vec<NearestStates>, GmqError> {
    if opts.radius.is_nan() || opts.radius <= 0.0 {
        return Err(config_error("predict_radius", "radius must be strictly positive"));
    }
    Ok(exponents
        .entries
        .iter()
        .map(|entry| {
            let mut matches: Vec<StateMatch> = table
                .rows
                .iter()
                .map(|row| StateMatch {
                    label: row.label.clone(),
                    dim: row.dim,
                    weight: row.weight,
                    exponent: row.exponent,
                    distance: (row.exponent - entry.n_quantized).abs(),
                })
                .filter(|candidate| candidate.distance < opts.radius)
                .collect();
            matches.sort_by(|lhs, rhs| {
                lhs.distance
                    .total_cmp(&rhs.distance)
                    .then_with(|| lhs.dim.cmp(&rhs.dim))
                    .then_with(|| lhs.weight.cmp(&rhs.weight))
                    .then_with(|| lhs.label.cmp(&rhs.label))
            });
            matches.truncate(opts.k);
            NearestStates {
                name: entry.name.clone(),
                n_quantized: entry.n_quantized,
                matches,
            }
        })
        .collect())
}

/// State whose prediction best matches a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestAssignment {
    /// Record name.
    pub name: String,
    /// Group label of the chosen state.
    pub label: String,
    /// Chosen dimension.
    pub dim: u8,
    /// Chosen weight.
    pub weight: i64,
    /// Quantized exponent of the record.
    pub n_actual: f64,
    /// Prediction for the chosen state.
    pub n_predicted: f64,
    /// `|n_predicted - n_actual|`.
    pub error: f64,
}

/// Per record, the state with the smallest exponent error. Ties keep the state
/// that comes first in the space.
pub fn best_assignments(
    model: &StateModel,
    space: &StateSpace,
    exponents: &ExponentReport,
) -> Result<Vec<BestAssignment>, GmqError> {
    let states = space.states()?;
    if states.is_empty() {
        return Err(config_error("predict_no_states", "state space is empty"));
    }
    let predicted: Vec<f64> = states
        .iter()
        .map(|state| model.exponent(&state.assignment))
        .collect();
    Ok(exponents
        .entries
        .iter()
        .filter_map(|entry| {
            let mut best: Option<(usize, f64)> = None;
            for (index, n_predicted) in predicted.iter().enumerate() {
                let error = (n_predicted - entry.n_quantized).abs();
                let better = match best {
                    None => error.is_finite(),
                    Some((_, current)) => error.partial_cmp(&current) == Some(Ordering::Less),
                };
                if better {
                    best = Some((index, error));
                }
            }
            best.map(|(index, error)| BestAssignment {
                name: entry.name.clone(),
                label: states[index].label.clone(),
                dim: states[index].assignment.dim,
                weight: states[index].assignment.weight,
                n_actual: entry.n_quantized,
                n_predicted: predicted[index],
                error,
            })
        })
        .collect())
}
