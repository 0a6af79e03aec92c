use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gmq_decomp::{decompose_all, summarize, AxisRange, DecomposeOpts, SearchMode};
use gmq_quant::quantize_all;

use crate::{read_yaml, write_json, InputArgs};

#[derive(Args, Debug)]
pub struct DecomposeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Output directory for `decompositions.json` and `patterns.json`.
    #[arg(long)]
    pub out: PathBuf,
    /// YAML file with search options (box, mode, limit, max_volume).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Switch to best-fit mode with offsets in `[-radius, radius]`.
    #[arg(long)]
    pub offset_radius: Option<i64>,
    /// Report at most this many hits per record.
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn run(args: &DecomposeArgs) -> Result<(), Box<dyn Error>> {
    let mut opts: DecomposeOpts = read_yaml(args.config.as_deref())?;
    if let Some(radius) = args.offset_radius {
        opts.mode = SearchMode::BestFit {
            offset: AxisRange::symmetric(radius),
        };
    }
    if args.limit.is_some() {
        opts.limit = args.limit;
    }

    let (set, reference) = args.input.load()?;
    let exponents = quantize_all(&set.records, &reference)?;
    let mut report = decompose_all(&exponents.entries, &opts);
    let mut failures = set.failures;
    failures.extend(exponents.failures);
    failures.append(&mut report.failures);
    report.failures = failures;
    let patterns = summarize(&report, &set.records);

    write_json(args.out.join("decompositions.json"), &report)?;
    write_json(args.out.join("patterns.json"), &patterns)?;
    println!(
        "gmq decompose: {} records, {} unsolved, {} failures",
        report.entries.len(),
        report.unsolved(),
        report.failures.len()
    );
    Ok(())
}
