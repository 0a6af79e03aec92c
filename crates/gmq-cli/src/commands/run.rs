use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gmq_run::{load_plan, run_plan, AnalysisPlan};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML analysis plan; defaults apply when omitted.
    #[arg(long)]
    pub plan: Option<PathBuf>,
    /// Output directory for `analysis_report.json`.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let plan = match &args.plan {
        Some(path) => load_plan(path)?,
        None => AnalysisPlan::default(),
    };
    let report = run_plan(&plan, &args.out)?;
    println!(
        "gmq run: plan {} | {} quantized, {} fits, {} failures",
        &report.provenance.plan_hash[..12.min(report.provenance.plan_hash.len())],
        report.exponents.entries.len(),
        report.fits.len(),
        report.failures.len()
    );
    Ok(())
}
