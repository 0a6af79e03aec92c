#![deny(missing_docs)]
#![doc = "Predicted masses for hypothetical `(dim, weight)` states and unseen basis triples."]

/// Unseen basis triples ranked by mass.
pub mod lattice;
/// Fitted exponent model over state labels.
pub mod model;
/// Per-record comparisons against predicted states.
pub mod nearest;
/// State spaces.
pub mod states;
/// Prediction tables and mass windows.
pub mod table;

pub use lattice::{enumerate_lattice, known_triples, LatticeCandidate, LatticeOpts, LatticeReport};
pub use model::{OutputScale, StateModel};
pub use nearest::{
    best_assignments, nearest_states, BestAssignment, NearestOpts, NearestStates, StateMatch,
};
pub use states::{State, StateGroup, StateSpace};
pub use table::{predict, MassWindow, PredictionRow, PredictionTable};
