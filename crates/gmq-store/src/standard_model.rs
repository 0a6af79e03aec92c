//! Built-in Standard Model dataset (PDG central values, GeV).

use gmq_core::{Category, ParticleRecord, Rational};

struct Row {
    name: &'static str,
    mass: f64,
    mass_error: f64,
    charge: (i64, i64),
    spin: (i64, i64),
    category: Category,
    generation: u8,
}

const ROWS: &[Row] = &[
    Row { name: "electron", mass: 0.000_510_998_946_1, mass_error: 3.1e-12, charge: (-1, 1), spin: (1, 2), category: Category::Lepton, generation: 1 },
    Row { name: "electron_neutrino", mass: 1.0e-15, mass_error: 1.0e-16, charge: (0, 1), spin: (1, 2), category: Category::Lepton, generation: 1 },
    Row { name: "muon", mass: 0.105_658_374_5, mass_error: 2.4e-9, charge: (-1, 1), spin: (1, 2), category: Category::Lepton, generation: 2 },
    Row { name: "muon_neutrino", mass: 1.9e-13, mass_error: 1.0e-14, charge: (0, 1), spin: (1, 2), category: Category::Lepton, generation: 2 },
    Row { name: "tau", mass: 1.776_86, mass_error: 1.2e-4, charge: (-1, 1), spin: (1, 2), category: Category::Lepton, generation: 3 },
    Row { name: "tau_neutrino", mass: 1.8e-12, mass_error: 1.0e-13, charge: (0, 1), spin: (1, 2), category: Category::Lepton, generation: 3 },
    Row { name: "up", mass: 0.0022, mass_error: 6.0e-4, charge: (2, 3), spin: (1, 2), category: Category::Quark, generation: 1 },
    Row { name: "down", mass: 0.0047, mass_error: 5.0e-4, charge: (-1, 3), spin: (1, 2), category: Category::Quark, generation: 1 },
    Row { name: "charm", mass: 1.28, mass_error: 0.03, charge: (2, 3), spin: (1, 2), category: Category::Quark, generation: 2 },
    Row { name: "strange", mass: 0.096, mass_error: 0.008, charge: (-1, 3), spin: (1, 2), category: Category::Quark, generation: 2 },
    Row { name: "top", mass: 173.0, mass_error: 0.4, charge: (2, 3), spin: (1, 2), category: Category::Quark, generation: 3 },
    Row { name: "bottom", mass: 4.18, mass_error: 0.03, charge: (-1, 3), spin: (1, 2), category: Category::Quark, generation: 3 },
    Row { name: "photon", mass: 0.0, mass_error: 0.0, charge: (0, 1), spin: (1, 1), category: Category::Boson, generation: 0 },
    Row { name: "W", mass: 80.379, mass_error: 0.012, charge: (1, 1), spin: (1, 1), category: Category::Boson, generation: 0 },
    Row { name: "Z", mass: 91.1876, mass_error: 0.0021, charge: (0, 1), spin: (1, 1), category: Category::Boson, generation: 0 },
    Row { name: "gluon", mass: 0.0, mass_error: 0.0, charge: (0, 1), spin: (1, 1), category: Category::Boson, generation: 0 },
    Row { name: "higgs", mass: 125.1, mass_error: 0.11, charge: (0, 1), spin: (0, 1), category: Category::Boson, generation: 0 },
];

/// Returns the seventeen Standard Model particles, massless bosons included.
pub fn standard_model() -> Vec<ParticleRecord> {
    ROWS.iter()
        .map(|row| {
            let mut record = ParticleRecord::new(row.name, row.mass, row.category)
                .with_charge(Rational::new(row.charge.0, row.charge.1).unwrap_or_default())
                .with_spin(Rational::new(row.spin.0, row.spin.1).unwrap_or_default());
            if row.mass_error > 0.0 {
                record = record.with_mass_error(row.mass_error);
            }
            if row.generation > 0 {
                record = record.with_generation(row.generation);
            }
            if row.category == Category::Quark {
                record = record.with_extra("color", 3.0);
            }
            record
        })
        .collect()
}
