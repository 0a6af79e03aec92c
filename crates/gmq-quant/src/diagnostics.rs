use serde::{Deserialize, Serialize};

use crate::report::{ExponentEntry, ExponentReport};

/// Default closeness to the integer grid counted as a match.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Digits whose value is a Fibonacci number.
pub const FIBONACCI_DIGITS: [u8; 5] = [1, 2, 3, 5, 8];

/// Multipliers applied to each code for the digital-root scan.
pub const ROOT_MULTIPLIERS: [i64; 4] = [1, 2, 3, 4];

/// Options for [`diagnose`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsOpts {
    /// Grid tolerance used by the integer-match statistics.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Factors `f` tested for integrality of `f * n_quantized`.
    #[serde(default = "default_factors")]
    pub factors: Vec<u32>,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_factors() -> Vec<u32> {
    (1..=6).collect()
}

impl Default for DiagnosticsOpts {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            factors: default_factors(),
        }
    }
}

/// How many quantized exponents become integral after scaling by `factor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorCount {
    /// Scale factor.
    pub factor: u32,
    /// Entries with `factor * n_quantized` integral.
    pub integral: usize,
    /// Entries inspected.
    pub total: usize,
}

/// Digital roots of `q, 2q, 3q, 4q` for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalRootRow {
    /// Record name.
    pub name: String,
    /// Integer code.
    pub q: i64,
    /// Digital roots in multiplier order.
    pub roots: Vec<u8>,
    /// How many of the roots are Fibonacci digits.
    pub fibonacci_hits: usize,
}

/// Summary statistics over an [`ExponentReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantDiagnostics {
    /// Tolerance used.
    pub tolerance: f64,
    /// Entries with `|4 n_raw - q| <= tolerance`.
    pub integer_matches: usize,
    /// Entries inspected.
    pub total: usize,
    /// Mean of `|residual|`.
    pub mean_abs_residual: f64,
    /// Largest `|residual|`.
    pub max_abs_residual: f64,
    /// Factor scan rows.
    pub factor_scan: Vec<FactorCount>,
    /// Digital-root rows.
    pub digital_roots: Vec<DigitalRootRow>,
    /// Sum of Fibonacci hits over all rows.
    pub fibonacci_hits: usize,
}

/// Repeated digit sum of `|value|`; zero maps to zero.
pub fn digital_root(value: i64) -> u8 {
    let magnitude = value.unsigned_abs();
    if magnitude == 0 {
        0
    } else {
        (1 + (magnitude - 1) % 9) as u8
    }
}

/// Returns true when the digit is a Fibonacci number.
pub fn is_fibonacci_digit(digit: u8) -> bool {
    FIBONACCI_DIGITS.contains(&digit)
}

/// Digital-root row for one entry.
pub fn digital_root_row(entry: &ExponentEntry) -> DigitalRootRow {
    let roots: Vec<u8> = ROOT_MULTIPLIERS
        .iter()
        .map(|mult| digital_root(entry.q.saturating_mul(*mult)))
        .collect();
    let fibonacci_hits = roots.iter().filter(|root| is_fibonacci_digit(**root)).count();
    DigitalRootRow {
        name: entry.name.clone(),
        q: entry.q,
        roots,
        fibonacci_hits,
    }
}

/// Counts entries lying within `tolerance` of the integer grid.
pub fn integer_match_count(entries: &[ExponentEntry], tolerance: f64) -> usize {
    entries
        .iter()
        .filter(|entry| entry.residual.abs() <= tolerance)
        .count()
}

/// For each factor, counts entries whose scaled quantized exponent is integral.
pub fn factor_scan(entries: &[ExponentEntry], factors: &[u32], tolerance: f64) -> Vec<FactorCount> {
    factors
        .iter()
        .map(|factor| {
            let integral = entries
                .iter()
                .filter(|entry| {
                    let value = f64::from(*factor) * entry.n_quantized;
                    (value - value.round()).abs() < tolerance
                })
                .count();
            FactorCount {
                factor: *factor,
                integral,
                total: entries.len(),
            }
        })
        .collect()
}

/// Computes every diagnostic over a report.
pub fn diagnose(report: &ExponentReport, opts: &DiagnosticsOpts) -> QuantDiagnostics {
    let entries = &report.entries;
    let residuals: Vec<f64> = entries.iter().map(|entry| entry.residual.abs()).collect();
    let mean_abs_residual = if residuals.is_empty() {
        0.0
    } else {
        residuals.iter().sum::<f64>() / residuals.len() as f64
    };
    let max_abs_residual = residuals.iter().copied().fold(0.0, f64::max);
    let digital_roots: Vec<DigitalRootRow> = entries.iter().map(digital_root_row).collect();
    let fibonacci_hits = digital_roots.iter().map(|row| row.fibonacci_hits).sum();
    QuantDiagnostics {
        tolerance: opts.tolerance,
        integer_matches: integer_match_count(entries, opts.tolerance),
        total: entries.len(),
        mean_abs_residual,
        max_abs_residual,
        factor_scan: factor_scan(entries, &opts.factors, opts.tolerance),
        digital_roots,
        fibonacci_hits,
    }
}
