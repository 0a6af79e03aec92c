use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gmq_core::ParticleRecord;

use crate::report::DecompositionReport;
use crate::search::BasisTriple;

/// Minimum, maximum and mean of one coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStats {
    /// Smallest value.
    pub min: i64,
    /// Largest value.
    pub max: i64,
    /// Arithmetic mean.
    pub mean: f64,
}

impl AxisStats {
    fn from_values(values: &[i64]) -> Option<Self> {
        let min = *values.iter().min()?;
        let max = *values.iter().max()?;
        let mean = values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64;
        Some(Self { min, max, mean })
    }
}

/// Coefficient totals for a group of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoefficientTotals {
    /// Records in the group.
    pub count: usize,
    /// Sum of `a`.
    pub a: i64,
    /// Sum of `b`.
    pub b: i64,
    /// Sum of `c`.
    pub c: i64,
}

impl CoefficientTotals {
    fn add(&mut self, triple: &BasisTriple) {
        self.count += 1;
        self.a += triple.a;
        self.b += triple.b;
        self.c += triple.c;
    }

    /// `a + b + c` summed over the group.
    pub fn sum(&self) -> i64 {
        self.a + self.b + self.c
    }
}

/// Patterns in the preferred triples of a decomposition report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientSummary {
    /// Records with at least one hit.
    pub solved: usize,
    /// Statistics of `a`.
    pub a: Option<AxisStats>,
    /// Statistics of `b`.
    pub b: Option<AxisStats>,
    /// Statistics of `c`.
    pub c: Option<AxisStats>,
    /// Totals keyed by category label.
    pub by_category: BTreeMap<String, CoefficientTotals>,
    /// Totals keyed by generation, for records that carry one.
    pub by_generation: BTreeMap<u8, CoefficientTotals>,
    /// Records whose three coefficients are all even.
    pub all_even: usize,
    /// Most frequent `c` (smallest on ties).
    pub most_common_c: Option<i64>,
}

/// Summarises the preferred triple of every solved record. Generations are
/// looked up by name in `records`.
pub fn summarize(report: &DecompositionReport, records: &[ParticleRecord]) -> CoefficientSummary {
    let generations: BTreeMap<&str, u8> = records
        .iter()
        .filter_map(|record| record.generation.map(|gen| (record.name.as_str(), gen)))
        .collect();

    let mut by_category: BTreeMap<String, CoefficientTotals> = BTreeMap::new();
    let mut by_generation: BTreeMap<u8, CoefficientTotals> = BTreeMap::new();
    let mut c_counts: BTreeMap<i64, usize> = BTreeMap::new();
    let mut triples = Vec::new();
    for entry in &report.entries {
        let Some(hit) = entry.decomposition.best() else {
            continue;
        };
        let triple = hit.triple;
        by_category
            .entry(entry.category.to_string())
            .or_default()
            .add(&triple);
        if let Some(gen) = generations.get(entry.name.as_str()) {
            by_generation.entry(*gen).or_default().add(&triple);
        }
        *c_counts.entry(triple.c).or_default() += 1;
        triples.push(triple);
    }

    let column = |pick: fn(&BasisTriple) -> i64| -> Vec<i64> { triples.iter().map(pick).collect() };
    let most_common_c = c_counts
        .iter()
        .max_by(|lhs, rhs| lhs.1.cmp(rhs.1).then(rhs.0.cmp(lhs.0)))
        .map(|(c, _)| *c);

    CoefficientSummary {
        solved: triples.len(),
        a: AxisStats::from_values(&column(|t| t.a)),
        b: AxisStats::from_values(&column(|t| t.b)),
        c: AxisStats::from_values(&column(|t| t.c)),
        by_category,
        by_generation,
        all_even: triples
            .iter()
            .filter(|t| t.a % 2 == 0 && t.b % 2 == 0 && t.c % 2 == 0)
            .count(),
        most_common_c,
    }
}
