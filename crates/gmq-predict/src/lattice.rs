use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use gmq_core::errors::{ErrorInfo, GmqError};
use gmq_core::ReferenceScale;
use gmq_decomp::{AxisRange, BasisTriple, DecompositionReport, SearchBox, DEFAULT_MAX_VOLUME};
use gmq_quant::quantize::{check_reference, mass_for_code, STEPS_PER_UNIT};

use crate::table::MassWindow;

fn default_box() -> SearchBox {
    SearchBox::new(
        AxisRange::new(-35, -26),
        AxisRange::new(-20, 19),
        AxisRange::new(5, 14),
    )
}

fn default_codes() -> AxisRange {
    AxisRange::new(-299, 299)
}

fn default_window() -> MassWindow {
    MassWindow::new(1e-10, 1e10)
}

fn default_max_volume() -> u64 {
    DEFAULT_MAX_VOLUME
}

/// Lattice enumeration bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeOpts {
    /// Coefficient box.
    #[serde(default = "default_box", rename = "box")]
    pub search_box: SearchBox,
    /// Allowed codes `q`.
    #[serde(default = "default_codes")]
    pub codes: AxisRange,
    /// Allowed masses.
    #[serde(default = "default_window")]
    pub window: MassWindow,
    /// Keep only the lightest candidates.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Largest box accepted.
    #[serde(default = "default_max_volume")]
    pub max_volume: u64,
}

impl Default for LatticeOpts {
    fn default() -> Self {
        Self {
            search_box: default_box(),
            codes: default_codes(),
            window: default_window(),
            limit: None,
            max_volume: default_max_volume(),
        }
    }
}

/// Unseen triple with its implied mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeCandidate {
    /// Coefficients.
    pub triple: BasisTriple,
    /// `8a + 15b + 24c`.
    pub q: i64,
    /// `q / 4`.
    pub exponent: f64,
    /// `reference * phi^(q/4)`.
    pub mass: f64,
}

/// Ranked lattice candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeReport {
    /// Bounds used.
    pub opts: LatticeOpts,
    /// Candidates, lightest first.
    pub candidates: Vec<LatticeCandidate>,
    /// Candidates before `limit`.
    pub total: usize,
    /// Known triples found in the box.
    pub excluded_known: usize,
}

/// Best hit of every solved record.
pub fn known_triples(report: &DecompositionReport) -> BTreeSet<BasisTriple> {
    report
        .entries
        .iter()
        .filter_map(|entry| entry.decomposition.best().map(|hit| hit.triple))
        .collect()
}

/// Enumerates every triple in the box that is not known, keeps those whose
/// code and mass fall inside the bounds and ranks them by mass.
pub fn enumerate_lattice(
    opts: &LatticeOpts,
    reference: &ReferenceScale,
    known: &BTreeSet<BasisTriple>,
) -> Result<LatticeReport, GmqError> {
    check_reference(reference)?;
    opts.window.validate()?;
    opts.search_box.check_magnitude()?;
    let volume = opts.search_box.volume();
    if volume > opts.max_volume {
        return Err(GmqError::Config(
            ErrorInfo::new("lattice_box_volume", "lattice box exceeds the volume limit")
                .with_context("volume", volume.to_string())
                .with_context("max_volume", opts.max_volume.to_string()),
        ));
    }

    let SearchBox { a, b, c } = opts.search_box;
    let mut candidates = Vec::new();
    let mut excluded_known = 0;
    for a in a.lo..=a.hi {
        for b in b.lo..=b.hi {
            for c in c.lo..=c.hi {
                let triple = BasisTriple::new(a, b, c);
                if known.contains(&triple) {
                    excluded_known += 1;
                    continue;
                }
                let q = triple.value();
                if !opts.codes.contains(q) {
                    continue;
                }
                let mass = mass_for_code(q, reference);
                if !mass.is_finite() || !opts.window.contains(mass) {
                    continue;
                }
                candidates.push(LatticeCandidate {
                    triple,
                    q,
                    exponent: q as f64 / STEPS_PER_UNIT,
                    mass,
                });
            }
        }
    }
    candidates.sort_by(|lhs, rhs| {
        lhs.mass
            .total_cmp(&rhs.mass)
            .then_with(|| lhs.q.cmp(&rhs.q))
            .then_with(|| lhs.triple.cmp(&rhs.triple))
    });
    let total = candidates.len();
    if let Some(limit) = opts.limit {
        candidates.truncate(limit);
    }
    Ok(LatticeReport {
        opts: opts.clone(),
        candidates,
        total,
        excluded_known,
    })
}
