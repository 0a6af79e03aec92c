#![deny(missing_docs)]
#![doc = "Assignment labels, design matrices and SVD least squares for golden-ratio exponents."]

/// `(dim, weight)` labels and the tables and rules that produce them.
pub mod assignment;
/// Feature and target columns.
pub mod design;
/// Minimum-norm least squares.
pub mod lstsq;
/// Declarative fits over quantized records.
pub mod model;

pub use assignment::{
    casimir, weights_for, Assignment, AssignmentMap, AssignmentRule, WeightRule, DIMENSIONS,
};
pub use design::{DesignBuilder, DesignMatrix, Feature, Target};
pub use lstsq::{fit_least_squares, FitReport, LstsqOpts, SamplePrediction, INTERCEPT};
pub use model::{run_fit, AssignedSample, FitOutcome, FitSpec};
