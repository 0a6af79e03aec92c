use serde::{Deserialize, Serialize};

use gmq_core::errors::{GmqError, RecordFailure};
use gmq_core::{Category, ParticleRecord, ReferenceScale};

use crate::quantize::{check_reference, mass_for_exponent, quantize_record, QuantizedExponent};

/// Per-record quantization outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentEntry {
    /// Record name.
    pub name: String,
    /// Record category.
    pub category: Category,
    /// Raw exponent.
    pub n_raw: f64,
    /// Exponent snapped to the quarter grid.
    pub n_quantized: f64,
    /// Integer code `4 n_quantized`.
    pub q: i64,
    /// `4 n_raw - q`.
    pub residual: f64,
    /// Mass implied by the quantized exponent.
    pub grid_mass: f64,
    /// `|grid_mass - mass| / mass`.
    pub relative_error: f64,
}

impl ExponentEntry {
    /// Assembles an entry from a record and its quantized exponent.
    pub fn new(record: &ParticleRecord, exponent: QuantizedExponent, reference: &ReferenceScale) -> Self {
        let grid_mass = mass_for_exponent(exponent.n_quantized, reference);
        Self {
            name: record.name.clone(),
            category: record.category,
            n_raw: exponent.n_raw,
            n_quantized: exponent.n_quantized,
            q: exponent.q,
            residual: exponent.residual(),
            grid_mass,
            relative_error: (grid_mass - record.mass).abs() / record.mass,
        }
    }

    /// The quantized exponent carried by this entry.
    pub fn exponent(&self) -> QuantizedExponent {
        QuantizedExponent {
            n_raw: self.n_raw,
            n_quantized: self.n_quantized,
            q: self.q,
        }
    }
}

/// Batch quantization result. Entries keep input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentReport {
    /// Reference the exponents were measured against.
    pub reference: ReferenceScale,
    /// Successfully quantized records.
    pub entries: Vec<ExponentEntry>,
    /// Records rejected by the quantizer.
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

impl ExponentReport {
    /// Looks an entry up by record name.
    pub fn entry(&self, name: &str) -> Option<&ExponentEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}

/// Quantizes every record, collecting per-record failures instead of stopping.
/// An unusable reference fails the whole batch.
pub fn quantize_all(
    records: &[ParticleRecord],
    reference: &ReferenceScale,
) -> Result<ExponentReport, GmqError> {
    check_reference(reference)?;
    let mut entries = Vec::with_capacity(records.len());
    let mut failures = Vec::new();
    for record in records {
        match quantize_record(record, reference) {
            Ok(exponent) => entries.push(ExponentEntry::new(record, exponent, reference)),
            Err(error) => failures.push(RecordFailure::new(record.name.clone(), "quantize", error)),
        }
    }
    Ok(ExponentReport {
        reference: reference.clone(),
        entries,
        failures,
    })
}
