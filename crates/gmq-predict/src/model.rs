use serde::{Deserialize, Serialize};

use gmq_core::errors::{ErrorInfo, GmqError};
use gmq_fit::{Assignment, FitReport, Target, INTERCEPT};
use gmq_quant::quantize::STEPS_PER_UNIT;

/// What the fitted value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputScale {
    /// Golden-ratio exponent `n`.
    #[default]
    Exponent,
    /// Integer code `4n`.
    Code,
}

impl OutputScale {
    /// Scale matching a fit target. Extra quantum numbers have none.
    pub fn for_target(target: &Target) -> Result<Self, GmqError> {
        match target {
            Target::QuantizedExponent | Target::RawExponent => Ok(OutputScale::Exponent),
            Target::Code => Ok(OutputScale::Code),
            Target::Extra(_) => Err(GmqError::Config(
                ErrorInfo::new("predict_target", "fit target is not an exponent or a code")
                    .with_context("target", target.to_string()),
            )),
        }
    }
}

/// `n = alpha * dim + beta * weight + kappa * casimir + gamma`, with absent
/// terms at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateModel {
    /// Coefficient on `dim`.
    pub dim: f64,
    /// Coefficient on `weight`.
    pub weight: f64,
    /// Coefficient on `casimir`.
    pub casimir: f64,
    /// Constant term.
    pub intercept: f64,
    /// Scale of the fitted value.
    pub scale: OutputScale,
}

impl StateModel {
    /// Reads coefficients from a fit over `dim`, `weight`, `casimir` and
    /// `intercept`. Any other column is a configuration error.
    pub fn from_fit(report: &FitReport, scale: OutputScale) -> Result<Self, GmqError> {
        if report.feature_names.len() != report.coefficients.len() {
            return Err(GmqError::Config(
                ErrorInfo::new("predict_fit_shape", "fit names and coefficients differ in length")
                    .with_context("names", report.feature_names.len().to_string())
                    .with_context("coefficients", report.coefficients.len().to_string()),
            ));
        }
        let mut model = Self {
            dim: 0.0,
            weight: 0.0,
            casimir: 0.0,
            intercept: 0.0,
            scale,
        };
        for (name, coefficient) in report.feature_names.iter().zip(&report.coefficients) {
            let slot = match name.as_str() {
                "dim" => &mut model.dim,
                "weight" => &mut model.weight,
                "casimir" => &mut model.casimir,
                INTERCEPT => &mut model.intercept,
                _ => {
                    return Err(GmqError::Config(
                        ErrorInfo::new("predict_feature", "fit uses a column states do not carry")
                            .with_context("feature", name)
                            .with_hint("fit over dim, weight, casimir and intercept only"),
                    ))
                }
            };
            *slot = *coefficient;
        }
        Ok(model)
    }

    /// Fitted value on the model's own scale.
    pub fn raw(&self, assignment: &Assignment) -> f64 {
        self.dim * f64::from(assignment.dim)
            + self.weight * assignment.weight as f64
            + self.casimir * assignment.casimir()
            + self.intercept
    }

    /// Predicted golden-ratio exponent.
    pub fn exponent(&self, assignment: &Assignment) -> f64 {
        match self.scale {
            OutputScale::Exponent => self.raw(assignment),
            OutputScale::Code => self.raw(assignment) / STEPS_PER_UNIT,
        }
    }
}
