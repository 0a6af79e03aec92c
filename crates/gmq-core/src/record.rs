//! Particle records as loaded from the store.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rational::Rational;

/// Coarse particle family used for indicator features and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Charged leptons and neutrinos.
    Lepton,
    /// Quarks.
    Quark,
    /// Gauge and scalar bosons.
    Boson,
    /// Anything else.
    Other,
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 4] = [
        Category::Lepton,
        Category::Quark,
        Category::Boson,
        Category::Other,
    ];

    /// Maps a free-form store label onto a category. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "lepton" | "leptons" => Category::Lepton,
            "quark" | "quarks" => Category::Quark,
            "boson" | "bosons" | "gauge_boson" | "gauge-boson" | "scalar" => Category::Boson,
            _ => Category::Other,
        }
    }

    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Lepton => "lepton",
            Category::Quark => "quark",
            Category::Boson => "boson",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One particle as handed to the engine by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Unique record name (for example `muon`).
    pub name: String,
    /// Mass in GeV.
    pub mass: f64,
    /// Optional uncertainty on the mass in GeV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_error: Option<f64>,
    /// Particle family.
    pub category: Category,
    /// Generation index when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<u8>,
    /// Electric charge in units of e.
    #[serde(default)]
    pub charge: Rational,
    /// Spin.
    #[serde(default)]
    pub spin: Rational,
    /// Additional quantum numbers keyed by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, f64>,
}

impl ParticleRecord {
    /// Creates a record with zero charge and spin and no extra quantum numbers.
    pub fn new(name: impl Into<String>, mass: f64, category: Category) -> Self {
        Self {
            name: name.into(),
            mass,
            mass_error: None,
            category,
            generation: None,
            charge: Rational::ZERO,
            spin: Rational::ZERO,
            extra: BTreeMap::new(),
        }
    }

    /// Sets the generation index.
    pub fn with_generation(mut self, generation: u8) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Sets the charge.
    pub fn with_charge(mut self, charge: Rational) -> Self {
        self.charge = charge;
        self
    }

    /// Sets the spin.
    pub fn with_spin(mut self, spin: Rational) -> Self {
        self.spin = spin;
        self
    }

    /// Sets the mass uncertainty.
    pub fn with_mass_error(mut self, error: f64) -> Self {
        self.mass_error = Some(error);
        self
    }

    /// Adds an extra quantum number.
    pub fn with_extra(mut self, key: impl Into<String>, value: f64) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
