use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gmq_core::errors::{config_error, ErrorInfo, GmqError, RecordFailure};
use gmq_core::{Category, ParticleRecord};
use gmq_quant::ExponentReport;

use crate::assignment::{Assignment, AssignmentMap};

/// One design-matrix column.
///
/// Written as `dim`, `weight`, `casimir`, `charge`, `spin`, `generation`,
/// `category:<name>` or `extra:<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Feature {
    /// Assigned representation dimension.
    Dim,
    /// Assigned weight.
    Weight,
    /// Normalized Casimir of the assigned dimension.
    Casimir,
    /// Electric charge.
    Charge,
    /// Spin.
    Spin,
    /// Generation index; records without one are skipped.
    Generation,
    /// 1 for records of the category, else 0.
    Category(Category),
    /// Extra quantum number; records without it are skipped.
    Extra(String),
}

impl Feature {
    /// Whether the column needs an assignment.
    pub fn needs_assignment(&self) -> bool {
        matches!(self, Feature::Dim | Feature::Weight | Feature::Casimir)
    }

    fn value(&self, record: &ParticleRecord, assignment: Option<&Assignment>) -> Option<f64> {
        match self {
            Feature::Dim => assignment.map(|a| f64::from(a.dim)),
            Feature::Weight => assignment.map(|a| a.weight as f64),
            Feature::Casimir => assignment.map(Assignment::casimir),
            Feature::Charge => Some(record.charge.to_f64()),
            Feature::Spin => Some(record.spin.to_f64()),
            Feature::Generation => record.generation.map(f64::from),
            Feature::Category(category) => {
                Some(if record.category == *category { 1.0 } else { 0.0 })
            }
            Feature::Extra(key) => record.extra.get(key).copied(),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Dim => f.write_str("dim"),
            Feature::Weight => f.write_str("weight"),
            Feature::Casimir => f.write_str("casimir"),
            Feature::Charge => f.write_str("charge"),
            Feature::Spin => f.write_str("spin"),
            Feature::Generation => f.write_str("generation"),
            Feature::Category(category) => write!(f, "category:{category}"),
            Feature::Extra(key) => write!(f, "extra:{key}"),
        }
    }
}

impl FromStr for Feature {
    type Err = GmqError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let feature = match raw.trim() {
            "dim" => Feature::Dim,
            "weight" => Feature::Weight,
            "casimir" => Feature::Casimir,
            "charge" => Feature::Charge,
            "spin" => Feature::Spin,
            "generation" => Feature::Generation,
            other => match other.split_once(':') {
                Some(("category", label)) => Category::ALL
                    .into_iter()
                    .find(|category| category.as_str() == label)
                    .map(Feature::Category)
                    .ok_or_else(|| {
                        GmqError::Config(
                            ErrorInfo::new("fit_feature", "unknown category")
                                .with_context("feature", raw)
                                .with_hint("use one of lepton, quark, boson, other"),
                        )
                    })?,
                Some(("extra", key)) if !key.is_empty() => Feature::Extra(key.to_string()),
                _ => {
                    return Err(GmqError::Config(
                        ErrorInfo::new("fit_feature", "unknown feature").with_context("feature", raw),
                    ))
                }
            },
        };
        Ok(feature)
    }
}

impl TryFrom<String> for Feature {
    type Error = GmqError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Feature> for String {
    fn from(value: Feature) -> Self {
        value.to_string()
    }
}

/// Regression target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Target {
    /// `n_quantized`.
    #[default]
    QuantizedExponent,
    /// `n_raw`.
    RawExponent,
    /// Integer code `q`.
    Code,
    /// An extra quantum number (`extra:<key>`).
    Extra(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::QuantizedExponent => f.write_str("quantized-exponent"),
            Target::RawExponent => f.write_str("raw-exponent"),
            Target::Code => f.write_str("code"),
            Target::Extra(key) => write!(f, "extra:{key}"),
        }
    }
}

impl FromStr for Target {
    type Err = GmqError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "quantized-exponent" | "exponent" | "n" => Ok(Target::QuantizedExponent),
            "raw-exponent" | "n-raw" => Ok(Target::RawExponent),
            "code" | "q" => Ok(Target::Code),
            other => match other.strip_prefix("extra:") {
                Some(key) if !key.is_empty() => Ok(Target::Extra(key.to_string())),
                _ => Err(GmqError::Config(
                    ErrorInfo::new("fit_target", "unknown target").with_context("target", raw),
                )),
            },
        }
    }
}

impl TryFrom<String> for Target {
    type Error = GmqError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Target> for String {
    fn from(value: Target) -> Self {
        value.to_string()
    }
}

/// Assembled regression input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignMatrix {
    /// Column names, without the intercept.
    pub feature_names: Vec<String>,
    /// Record name per row.
    pub sample_names: Vec<String>,
    /// Feature rows.
    pub rows: Vec<Vec<f64>>,
    /// Target per row.
    pub targets: Vec<f64>,
    /// Assignment used per row, when any feature needed one.
    pub assignments: Vec<Option<Assignment>>,
    /// Records that could not become a row.
    pub failures: Vec<RecordFailure>,
}

/// Builds a [`DesignMatrix`] from records, their exponents and an assignment map.
#[derive(Debug, Clone)]
pub struct DesignBuilder {
    features: Vec<Feature>,
    target: Target,
}

impl DesignBuilder {
    /// Creates a builder. At least one feature is required.
    pub fn new(features: Vec<Feature>, target: Target) -> Result<Self, GmqError> {
        if features.is_empty() {
            return Err(config_error("fit_no_features", "at least one feature is required"));
        }
        Ok(Self { features, target })
    }

    /// Columns in order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Regression target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// One row per quantized record, in exponent-report order. Records missing a
    /// feature, an assignment or the target are reported as failures.
    pub fn build(
        &self,
        records: &[ParticleRecord],
        exponents: &ExponentReport,
        assignments: &AssignmentMap,
    ) -> DesignMatrix {
        let by_name: BTreeMap<&str, &ParticleRecord> = records
            .iter()
            .map(|record| (record.name.as_str(), record))
            .collect();
        let needs_assignment = self.features.iter().any(Feature::needs_assignment);
        let mut design = DesignMatrix {
            feature_names: self.features.iter().map(Feature::to_string).collect(),
            sample_names: Vec::new(),
            rows: Vec::new(),
            targets: Vec::new(),
            assignments: Vec::new(),
            failures: Vec::new(),
        };

        for entry in &exponents.entries {
            let Some(record) = by_name.get(entry.name.as_str()) else {
                design.failures.push(RecordFailure::new(
                    entry.name.clone(),
                    "design",
                    GmqError::Fit(
                        ErrorInfo::new("fit_unknown_record", "exponent has no matching record")
                            .with_context("name", &entry.name),
                    ),
                ));
                continue;
            };
            let assignment = if needs_assignment {
                match assignments.resolve(record, entry.q) {
                    Ok(assignment) => Some(assignment),
                    Err(error) => {
                        design
                            .failures
                            .push(RecordFailure::new(entry.name.clone(), "assign", error));
                        continue;
                    }
                }
            } else {
                None
            };

            let mut row = Vec::with_capacity(self.features.len());
            let mut missing = None;
            for feature in &self.features {
                match feature.value(record, assignment.as_ref()) {
                    Some(value) if value.is_finite() => row.push(value),
                    _ => {
                        missing = Some(feature.to_string());
                        break;
                    }
                }
            }
            if let Some(feature) = missing {
                design.failures.push(RecordFailure::new(
                    entry.name.clone(),
                    "design",
                    GmqError::Fit(
                        ErrorInfo::new("fit_missing_feature", "feature missing or not finite")
                            .with_context("name", &entry.name)
                            .with_context("feature", feature),
                    ),
                ));
                continue;
            }

            let target = match &self.target {
                Target::QuantizedExponent => Some(entry.n_quantized),
                Target::RawExponent => Some(entry.n_raw),
                Target::Code => Some(entry.q as f64),
                Target::Extra(key) => record.extra.get(key).copied(),
            };
            let Some(target) = target.filter(|value| value.is_finite()) else {
                design.failures.push(RecordFailure::new(
                    entry.name.clone(),
                    "design",
                    GmqError::Fit(
                        ErrorInfo::new("fit_missing_target", "target missing or not finite")
                            .with_context("name", &entry.name)
                            .with_context("target", self.target.to_string()),
                    ),
                ));
                continue;
            };

            design.sample_names.push(entry.name.clone());
            design.rows.push(row);
            design.targets.push(target);
            design.assignments.push(assignment);
        }
        design
    }
}
