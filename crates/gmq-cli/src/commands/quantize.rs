use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gmq_quant::{diagnose, quantize_all, DiagnosticsOpts};

use crate::{write_json, InputArgs};

#[derive(Args, Debug)]
pub struct QuantizeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output directory for `exponents.json` and `diagnostics.json`.
    #[arg(long)]
    pub out: PathBuf,
    /// Grid tolerance for the integer-match count.
    #[arg(long, default_value_t = gmq_quant::diagnostics::DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}

pub fn run(args: &QuantizeArgs) -> Result<(), Box<dyn Error>> {
    let (set, reference) = args.input.load()?;
    let mut report = quantize_all(&set.records, &reference)?;
    let mut failures = set.failures;
    failures.append(&mut report.failures);
    report.failures = failures;
    let diagnostics = diagnose(
        &report,
        &DiagnosticsOpts {
            tolerance: args.tolerance,
            ..DiagnosticsOpts::default()
        },
    );
    write_json(args.out.join("exponents.json"), &report)?;
    write_json(args.out.join("diagnostics.json"), &diagnostics)?;
    println!(
        "gmq quantize: {} records, {} failures, {} on-grid",
        report.entries.len(),
        report.failures.len(),
        diagnostics.integer_matches
    );
    Ok(())
}
