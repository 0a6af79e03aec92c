use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use gmq_core::errors::{ErrorInfo, GmqError};

/// Name given to the appended constant column.
pub const INTERCEPT: &str = "intercept";

fn fit_error(code: &str, message: impl Into<String>) -> GmqError {
    GmqError::Fit(ErrorInfo::new(code, message.into()))
}

fn default_intercept() -> bool {
    true
}

fn default_integer_tolerance() -> f64 {
    0.1
}

/// Solver options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstsqOpts {
    /// Append a constant column named `intercept`.
    #[serde(default = "default_intercept")]
    pub intercept: bool,
    /// Predictions within this distance of an integer count as near-integer.
    #[serde(default = "default_integer_tolerance")]
    pub integer_tolerance: f64,
}

impl Default for LstsqOpts {
    fn default() -> Self {
        Self {
            intercept: default_intercept(),
            integer_tolerance: default_integer_tolerance(),
        }
    }
}

/// Fitted value for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePrediction {
    /// Sample label.
    pub name: String,
    /// Observed target.
    pub target: f64,
    /// `x_i . beta`.
    pub predicted: f64,
    /// `predicted - target`.
    pub residual: f64,
    /// Distance of `predicted` from the nearest integer.
    pub integer_deviation: f64,
}

/// Least-squares fit output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Column names, `intercept` last when present.
    pub feature_names: Vec<String>,
    /// Coefficient per column.
    pub coefficients: Vec<f64>,
    /// Per-sample fitted values.
    pub predictions: Vec<SamplePrediction>,
    /// Mean of `|residual|`.
    pub mean_abs_error: f64,
    /// Mean distance of the fitted values from the nearest integer.
    pub mean_integer_deviation: f64,
    /// Fitted values within the integer tolerance.
    pub near_integer_count: usize,
    /// Numerical rank of the design matrix.
    pub rank: usize,
    /// True when the rank is below the column count.
    pub rank_deficient: bool,
    /// Singular values in descending order.
    pub singular_values: Vec<f64>,
    /// Non-fatal observations about the fit.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl FitReport {
    /// Coefficient of a named column.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|feature| feature == name)
            .and_then(|index| self.coefficients.get(index).copied())
    }

    /// Evaluates the model on a feature row given without the intercept.
    pub fn evaluate(&self, row: &[f64]) -> Option<f64> {
        let has_intercept = self.feature_names.last().map(String::as_str) == Some(INTERCEPT);
        let explicit = self.coefficients.len().saturating_sub(usize::from(has_intercept));
        if row.len() != explicit {
            return None;
        }
        let mut value: f64 = row
            .iter()
            .zip(&self.coefficients)
            .map(|(x, beta)| x * beta)
            .sum();
        if has_intercept {
            value += self.coefficients.get(explicit).copied().unwrap_or(0.0);
        }
        Some(value)
    }
}

/// Solves `min ||X beta - y||^2` with an SVD pseudo-inverse.
///
/// Singular values below `max(N, k) * eps * sigma_max` are treated as zero, so
/// rank-deficient and underdetermined systems return the minimum-norm solution
/// and set `rank_deficient` instead of failing.
pub fn fit_least_squares(
    sample_names: &[String],
    feature_names: &[String],
    rows: &[Vec<f64>],
    targets: &[f64],
    opts: &LstsqOpts,
) -> Result<FitReport, GmqError> {
    let samples = rows.len();
    if samples == 0 {
        return Err(fit_error("fit_no_samples", "at least one sample is required"));
    }
    if targets.len() != samples || sample_names.len() != samples {
        return Err(GmqError::Fit(
            ErrorInfo::new("fit_shape", "rows, targets and names differ in length")
                .with_context("rows", samples.to_string())
                .with_context("targets", targets.len().to_string())
                .with_context("names", sample_names.len().to_string()),
        ));
    }
    let explicit = feature_names.len();
    let columns = explicit + usize::from(opts.intercept);
    if columns == 0 {
        return Err(fit_error("fit_no_columns", "design matrix has no columns"));
    }
    for (index, row) in rows.iter().enumerate() {
        if row.len() != explicit {
            return Err(GmqError::Fit(
                ErrorInfo::new("fit_shape", "row length differs from feature count")
                    .with_context("sample", &sample_names[index])
                    .with_context("expected", explicit.to_string())
                    .with_context("found", row.len().to_string()),
            ));
        }
        if row.iter().chain(std::iter::once(&targets[index])).any(|v| !v.is_finite()) {
            return Err(GmqError::Fit(
                ErrorInfo::new("fit_non_finite", "sample contains a non-finite value")
                    .with_context("sample", &sample_names[index]),
            ));
        }
    }

    let x = DMatrix::from_fn(samples, columns, |i, j| if j < explicit { rows[i][j] } else { 1.0 });
    let y = DVector::from_column_slice(targets);

    let svd = x.clone().svd(true, true);
    let mut singular_values: Vec<f64> = svd.singular_values.iter().copied().collect();
    singular_values.sort_by(|a, b| b.total_cmp(a));
    let sigma_max = singular_values.first().copied().unwrap_or(0.0);
    let tolerance = samples.max(columns) as f64 * f64::EPSILON * sigma_max;
    let rank = singular_values.iter().filter(|s| **s > tolerance).count();
    let beta = svd
        .solve(&y, tolerance)
        .map_err(|message| fit_error("fit_svd", message))?;

    let fitted = &x * &beta;
    let predictions: Vec<SamplePrediction> = (0..samples)
        .map(|i| {
            let predicted = fitted[i];
            SamplePrediction {
                name: sample_names[i].clone(),
                target: targets[i],
                predicted,
                residual: predicted - targets[i],
                integer_deviation: (predicted - predicted.round()).abs(),
            }
        })
        .collect();
    let mean_abs_error =
        predictions.iter().map(|p| p.residual.abs()).sum::<f64>() / samples as f64;
    let mean_integer_deviation =
        predictions.iter().map(|p| p.integer_deviation).sum::<f64>() / samples as f64;
    let near_integer_count = predictions
        .iter()
        .filter(|p| p.integer_deviation <= opts.integer_tolerance)
        .count();

    let mut names: Vec<String> = feature_names.to_vec();
    if opts.intercept {
        names.push(INTERCEPT.to_string());
    }
    let rank_deficient = rank < columns;
    let mut warnings = Vec::new();
    if samples < columns {
        warnings.push(format!(
            "underdetermined: {samples} samples for {columns} columns; minimum-norm solution"
        ));
    }
    if rank_deficient {
        warnings.push(format!(
            "rank deficient: rank {rank} of {columns} columns; minimum-norm solution"
        ));
    }

    Ok(FitReport {
        feature_names: names,
        coefficients: beta.iter().copied().collect(),
        predictions,
        mean_abs_error,
        mean_integer_deviation,
        near_integer_count,
        rank,
        rank_deficient,
        singular_values,
        warnings,
    })
}
