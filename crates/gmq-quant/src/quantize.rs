use serde::{Deserialize, Serialize};

use gmq_core::errors::{invalid_mass, ErrorInfo, GmqError};
use gmq_core::{ParticleRecord, ReferenceScale, PHI};

/// Number of quantization steps per unit exponent.
pub const STEPS_PER_UNIT: f64 = 4.0;

/// Exponent of a mass against the reference together with its quarter-step grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantizedExponent {
    /// `ln(mass / reference) / ln(phi)`.
    pub n_raw: f64,
    /// `round(4 n) / 4`.
    pub n_quantized: f64,
    /// Integer code `round(4 n)`.
    pub q: i64,
}

impl QuantizedExponent {
    /// Builds the grid point nearest to a raw exponent.
    pub fn from_raw(n_raw: f64) -> Self {
        let scaled = (n_raw * STEPS_PER_UNIT).round();
        Self {
            n_raw,
            n_quantized: scaled / STEPS_PER_UNIT,
            q: scaled as i64,
        }
    }

    /// Signed distance of `4 n_raw` from the integer grid.
    pub fn residual(&self) -> f64 {
        self.n_raw * STEPS_PER_UNIT - self.q as f64
    }
}

/// Rejects a reference that is not finite and strictly positive.
pub fn check_reference(reference: &ReferenceScale) -> Result<(), GmqError> {
    if reference.mass.is_finite() && reference.mass > 0.0 {
        return Ok(());
    }
    Err(GmqError::MissingReference(
        ErrorInfo::new(
            "reference_mass",
            "reference mass must be finite and strictly positive",
        )
        .with_context("name", &reference.name)
        .with_context("mass", reference.mass.to_string()),
    ))
}

/// Raw golden-ratio exponent `ln(mass / reference) / ln(phi)`.
pub fn exponent(mass: f64, reference: &ReferenceScale) -> Result<f64, GmqError> {
    check_reference(reference)?;
    if !mass.is_finite() {
        return Err(invalid_mass("mass_not_finite", "mass must be finite", mass));
    }
    if mass <= 0.0 {
        return Err(invalid_mass("mass_non_positive", "mass must be strictly positive", mass));
    }
    let n = (mass / reference.mass).ln() / PHI.ln();
    if !n.is_finite() {
        return Err(invalid_mass(
            "exponent_not_finite",
            "mass ratio overflows the exponent",
            mass,
        ));
    }
    Ok(n)
}

/// Quantizes a mass onto the quarter-step golden-ratio grid.
pub fn quantize(mass: f64, reference: &ReferenceScale) -> Result<QuantizedExponent, GmqError> {
    exponent(mass, reference).map(QuantizedExponent::from_raw)
}

/// Quantizes one record, tagging errors with the record name.
pub fn quantize_record(
    record: &ParticleRecord,
    reference: &ReferenceScale,
) -> Result<QuantizedExponent, GmqError> {
    quantize(record.mass, reference).map_err(|err| match err {
        GmqError::InvalidMass(info) => {
            GmqError::InvalidMass(info.with_context("name", &record.name))
        }
        other => other,
    })
}

/// Mass `reference * phi^n`.
pub fn mass_for_exponent(n: f64, reference: &ReferenceScale) -> f64 {
    reference.mass * PHI.powf(n)
}

/// Mass `reference * phi^(q / 4)` for an integer code.
pub fn mass_for_code(q: i64, reference: &ReferenceScale) -> f64 {
    mass_for_exponent(q as f64 / STEPS_PER_UNIT, reference)
}
