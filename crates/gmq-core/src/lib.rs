#![deny(missing_docs)]
#![doc = "Shared records, errors and serialization helpers for the golden-ratio mass quantization engine."]

pub mod errors;
pub mod hash;
pub mod provenance;
pub mod rational;
pub mod record;
pub mod reference;
pub mod serde;

pub use errors::{GmqError, ErrorInfo, RecordFailure};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rational::Rational;
pub use record::{Category, ParticleRecord};
pub use reference::{ReferenceScale, DEFAULT_REFERENCE};

/// The golden ratio `(1 + sqrt 5) / 2`.
pub const PHI: f64 = 1.618_033_988_749_895;

/// The basis constants `8, 15, 24` every integer code is decomposed over.
pub const BASIS: [i64; 3] = [8, 15, 24];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phi_matches_closed_form() {
        let closed = (1.0 + 5.0_f64.sqrt()) / 2.0;
        assert!((PHI - closed).abs() < 1e-15);
        assert!((PHI * PHI - PHI - 1.0).abs() < 1e-12);
    }
}
