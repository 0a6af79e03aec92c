//! Reference mass every exponent is measured against.

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, GmqError};
use crate::record::ParticleRecord;

/// Name of the record used as the unit of mass when none is configured.
pub const DEFAULT_REFERENCE: &str = "electron";

/// Mass of the distinguished record every exponent is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceScale {
    /// Record name the scale was taken from.
    pub name: String,
    /// Reference mass in GeV.
    pub mass: f64,
}

impl ReferenceScale {
    /// Validates and wraps a reference mass.
    pub fn new(name: impl Into<String>, mass: f64) -> Result<Self, GmqError> {
        let name = name.into();
        if !mass.is_finite() || mass <= 0.0 {
            return Err(GmqError::MissingReference(
                ErrorInfo::new(
                    "reference_mass",
                    "reference mass must be finite and strictly positive",
                )
                .with_context("name", name)
                .with_context("mass", mass.to_string()),
            ));
        }
        Ok(Self { name, mass })
    }

    /// Looks the reference up by name in a record slice.
    pub fn from_records(records: &[ParticleRecord], name: &str) -> Result<Self, GmqError> {
        let record = records
            .iter()
            .find(|record| record.name == name)
            .ok_or_else(|| {
                GmqError::MissingReference(
                    ErrorInfo::new("reference_absent", "reference record not present")
                        .with_context("name", name)
                        .with_hint("load a dataset containing the reference or change `reference`"),
                )
            })?;
        Self::new(record.name.clone(), record.mass)
    }
}
