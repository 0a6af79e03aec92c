use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gmq_core::errors::{ErrorInfo, GmqError};
use gmq_core::{Category, ParticleRecord};

/// Representation dimensions that may be assigned.
pub const DIMENSIONS: [u8; 4] = [1, 3, 4, 5];

/// Allowed weights for a dimension, in ascending order.
pub fn weights_for(dim: u8) -> Option<&'static [i64]> {
    match dim {
        1 => Some(&[0]),
        3 => Some(&[-1, 0, 1]),
        4 => Some(&[-3, -1, 1, 3]),
        5 => Some(&[-2, -1, 0, 1, 2]),
        _ => None,
    }
}

/// Normalized Casimir `dim^2 - 1`: 0, 8, 15 and 24 for the allowed dimensions.
pub fn casimir(dim: u8) -> f64 {
    let dim = f64::from(dim);
    dim * dim - 1.0
}

fn assignment_error(code: &str, message: &str, dim: u8, weight: i64) -> GmqError {
    GmqError::Config(
        ErrorInfo::new(code, message)
            .with_context("dim", dim.to_string())
            .with_context("weight", weight.to_string()),
    )
}

/// A record's `(dim, weight)` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// Representation dimension.
    pub dim: u8,
    /// Weight within the representation.
    pub weight: i64,
}

impl Assignment {
    /// Validates the pair against [`weights_for`].
    pub fn new(dim: u8, weight: i64) -> Result<Self, GmqError> {
        let weights = weights_for(dim).ok_or_else(|| {
            assignment_error("assign_dim", "dimension must be one of 1, 3, 4, 5", dim, weight)
        })?;
        if !weights.contains(&weight) {
            return Err(assignment_error(
                "assign_weight",
                "weight not allowed for this dimension",
                dim,
                weight,
            ));
        }
        Ok(Self { dim, weight })
    }

    /// Normalized Casimir of the dimension.
    pub fn casimir(&self) -> f64 {
        casimir(self.dim)
    }
}

/// How a rule picks the weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightRule {
    /// Always this weight.
    Fixed(i64),
    /// `weights_for(dim)[q mod len]`, with a non-negative remainder.
    CodeModulo,
}

/// Category/name pattern mapped to an assignment. Empty matchers match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    /// Exact record name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Substring of the record name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_contains: Option<String>,
    /// Record category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Assigned dimension.
    pub dim: u8,
    /// Weight selection.
    pub weight: WeightRule,
}

impl AssignmentRule {
    fn matches(&self, record: &ParticleRecord) -> bool {
        self.name.as_ref().map_or(true, |name| &record.name == name)
            && self
                .name_contains
                .as_ref()
                .map_or(true, |needle| record.name.contains(needle.as_str()))
            && self.category.map_or(true, |category| record.category == category)
    }

    fn resolve(&self, q: i64) -> Result<Assignment, GmqError> {
        let weight = match &self.weight {
            WeightRule::Fixed(weight) => *weight,
            WeightRule::CodeModulo => {
                let weights = weights_for(self.dim).ok_or_else(|| {
                    assignment_error("assign_dim", "dimension must be one of 1, 3, 4, 5", self.dim, 0)
                })?;
                weights[q.rem_euclid(weights.len() as i64) as usize]
            }
        };
        Assignment::new(self.dim, weight)
    }
}

/// Per-name table consulted first, then ordered rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentMap {
    /// Explicit assignments keyed by record name.
    #[serde(default)]
    pub table: BTreeMap<String, Assignment>,
    /// Rules tried in order when the table has no entry.
    #[serde(default)]
    pub rules: Vec<AssignmentRule>,
}

impl AssignmentMap {
    /// Dimension by family with weights taken from the code residue:
    /// electron and neutrinos trivial, quarks 3, other leptons 4, everything else 5.
    pub fn code_modulo() -> Self {
        let rule = |name: Option<&str>, contains: Option<&str>, category, dim, weight| AssignmentRule {
            name: name.map(str::to_string),
            name_contains: contains.map(str::to_string),
            category,
            dim,
            weight,
        };
        Self {
            table: BTreeMap::new(),
            rules: vec![
                rule(Some("electron"), None, None, 1, WeightRule::Fixed(0)),
                rule(None, Some("neutrino"), None, 1, WeightRule::Fixed(0)),
                rule(None, None, Some(Category::Quark), 3, WeightRule::CodeModulo),
                rule(None, None, Some(Category::Lepton), 4, WeightRule::CodeModulo),
                rule(None, None, None, 5, WeightRule::CodeModulo),
            ],
        }
    }

    /// Hand-picked table for the built-in Standard Model names.
    pub fn casimir_table() -> Self {
        let entries = [
            ("electron_neutrino", 1, 0),
            ("muon_neutrino", 1, 0),
            ("tau_neutrino", 1, 0),
            ("electron", 3, -1),
            ("up", 3, -1),
            ("down", 3, 0),
            ("strange", 3, 1),
            ("charm", 3, -1),
            ("bottom", 3, 0),
            ("top", 3, 1),
            ("muon", 4, -3),
            ("tau", 4, -1),
            ("W", 5, -2),
            ("Z", 5, -1),
            ("higgs", 5, 0),
        ];
        Self {
            table: entries
                .into_iter()
                .map(|(name, dim, weight)| (name.to_string(), Assignment { dim, weight }))
                .collect(),
            rules: Vec::new(),
        }
    }

    /// Checks every table entry and rule.
    pub fn validate(&self) -> Result<(), GmqError> {
        for (name, assignment) in &self.table {
            Assignment::new(assignment.dim, assignment.weight)
                .map_err(|err| with_name(err, name))?;
        }
        for rule in &self.rules {
            match rule.weight {
                WeightRule::Fixed(weight) => {
                    Assignment::new(rule.dim, weight)?;
                }
                WeightRule::CodeModulo => {
                    weights_for(rule.dim).ok_or_else(|| {
                        assignment_error("assign_dim", "dimension must be one of 1, 3, 4, 5", rule.dim, 0)
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Assignment for a record with integer code `q`.
    pub fn resolve(&self, record: &ParticleRecord, q: i64) -> Result<Assignment, GmqError> {
        if let Some(assignment) = self.table.get(&record.name) {
            return Assignment::new(assignment.dim, assignment.weight)
                .map_err(|err| with_name(err, &record.name));
        }
        let rule = self
            .rules
            .iter()
            .find(|rule| rule.matches(record))
            .ok_or_else(|| {
                GmqError::Config(
                    ErrorInfo::new("assign_missing", "no assignment table entry or rule matches")
                        .with_context("name", &record.name),
                )
            })?;
        rule.resolve(q).map_err(|err| with_name(err, &record.name))
    }
}

fn with_name(err: GmqError, name: &str) -> GmqError {
    match err {
        GmqError::Config(info) => GmqError::Config(info.with_context("name", name)),
        other => other,
    }
}
