use serde::{Deserialize, Serialize};

use gmq_core::errors::RecordFailure;
use gmq_core::Category;
use gmq_quant::ExponentEntry;

use crate::search::{decompose, DecomposeOpts, Decomposition};

/// Decomposition of one quantized record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionEntry {
    /// Record name.
    pub name: String,
    /// Record category.
    pub category: Category,
    /// Search outcome, including the box that was used.
    pub decomposition: Decomposition,
}

/// Batch decomposition output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionReport {
    /// Options shared by every search.
    pub opts: DecomposeOpts,
    /// One entry per successfully searched record.
    pub entries: Vec<DecompositionEntry>,
    /// Records whose search failed.
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

impl DecompositionReport {
    /// Looks an entry up by record name.
    pub fn entry(&self, name: &str) -> Option<&DecompositionEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Number of records with no hit.
    pub fn unsolved(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.decomposition.is_empty())
            .count()
    }
}

/// Decomposes the code of every entry. A failing search only drops that record.
pub fn decompose_all(entries: &[ExponentEntry], opts: &DecomposeOpts) -> DecompositionReport {
    let mut report = DecompositionReport {
        opts: opts.clone(),
        entries: Vec::with_capacity(entries.len()),
        failures: Vec::new(),
    };
    for entry in entries {
        match decompose(entry.q, opts) {
            Ok(decomposition) => report.entries.push(DecompositionEntry {
                name: entry.name.clone(),
                category: entry.category,
                decomposition,
            }),
            Err(error) => report
                .failures
                .push(RecordFailure::new(entry.name.clone(), "decompose", error)),
        }
    }
    report
}
