#![deny(missing_docs)]
#![doc = "Golden-ratio exponent quantizer: mass to quarter-step exponent and integer code."]

/// Statistics over quantized exponents.
pub mod diagnostics;
/// Single-mass quantization and its inverse.
pub mod quantize;
/// Batch quantization with partial failure.
pub mod report;

pub use diagnostics::{
    diagnose, digital_root, factor_scan, integer_match_count, DiagnosticsOpts, QuantDiagnostics,
};
pub use quantize::{
    exponent, mass_for_code, mass_for_exponent, quantize, quantize_record, QuantizedExponent,
};
pub use report::{quantize_all, ExponentEntry, ExponentReport};
