use serde::{Deserialize, Serialize};

use gmq_core::errors::GmqError;
use gmq_fit::{weights_for, Assignment, DIMENSIONS};

/// Labelled representation with the weights to enumerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateGroup {
    /// Display label, e.g. `4D`.
    pub label: String,
    /// Representation dimension.
    pub dim: u8,
    /// Weights, in enumeration order.
    pub weights: Vec<i64>,
}

impl StateGroup {
    /// Group with every allowed weight of `dim`, labelled `<dim>D`.
    pub fn full(dim: u8) -> Option<Self> {
        weights_for(dim).map(|weights| Self {
            label: format!("{dim}D"),
            dim,
            weights: weights.to_vec(),
        })
    }
}

/// One enumerated state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// Group label.
    pub label: String,
    /// Assigned label.
    pub assignment: Assignment,
}

/// Ordered list of state groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSpace {
    /// Groups in enumeration order.
    pub groups: Vec<StateGroup>,
}

impl Default for StateSpace {
    /// The thirteen states `1D`, `3D x 3`, `4D x 4` and `5D x 5`.
    fn default() -> Self {
        Self {
            groups: DIMENSIONS.iter().filter_map(|dim| StateGroup::full(*dim)).collect(),
        }
    }
}

impl StateSpace {
    /// Flattens the groups, checking every `(dim, weight)` pair.
    pub fn states(&self) -> Result<Vec<State>, GmqError> {
        let mut states = Vec::new();
        for group in &self.groups {
            for weight in &group.weights {
                let assignment = Assignment::new(group.dim, *weight).map_err(|err| match err {
                    GmqError::Config(info) => {
                        GmqError::Config(info.with_context("label", &group.label))
                    }
                    other => other,
                })?;
                states.push(State {
                    label: group.label.clone(),
                    assignment,
                });
            }
        }
        Ok(states)
    }
}
