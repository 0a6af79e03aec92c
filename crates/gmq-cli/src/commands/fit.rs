use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gmq_fit::{run_fit, FitSpec};
use gmq_quant::quantize_all;

use crate::{read_yaml, write_json, InputArgs};

#[derive(Args, Debug)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// YAML fit spec (features, target, intercept, assignments).
    #[arg(long)]
    pub spec: Option<PathBuf>,
    /// Output directory for `fit.json`.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &FitArgs) -> Result<(), Box<dyn Error>> {
    let spec: FitSpec = read_yaml(args.spec.as_deref())?;
    let (set, reference) = args.input.load()?;
    let exponents = quantize_all(&set.records, &reference)?;
    let outcome = run_fit(&spec, &set.records, &exponents)?;
    write_json(args.out.join("fit.json"), &outcome)?;

    let coefficients: Vec<String> = outcome
        .report
        .feature_names
        .iter()
        .zip(&outcome.report.coefficients)
        .map(|(name, value)| format!("{name}={value:.4}"))
        .collect();
    println!(
        "gmq fit: {} samples, {}, mae {:.4}{}",
        outcome.report.predictions.len(),
        coefficients.join(" "),
        outcome.report.mean_abs_error,
        if outcome.report.rank_deficient { " (rank deficient)" } else { "" }
    );
    for warning in &outcome.report.warnings {
        println!("warning: {warning}");
    }
    Ok(())
}
