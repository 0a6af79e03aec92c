use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use gmq_decomp::{decompose_all, DecomposeOpts};
use gmq_fit::{run_fit, FitSpec};
use gmq_predict::{
    best_assignments, enumerate_lattice, known_triples, predict, LatticeOpts, MassWindow,
    OutputScale, PredictionTable, StateModel, StateSpace,
};
use gmq_quant::quantize_all;

use crate::{read_yaml, write_json, InputArgs};

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// YAML fit spec; must use only dim, weight and casimir columns.
    #[arg(long)]
    pub spec: Option<PathBuf>,
    /// Output directory for `predictions.json`.
    #[arg(long)]
    pub out: PathBuf,
    /// Smallest predicted mass kept (GeV).
    #[arg(long, default_value_t = 1e-20)]
    pub min_mass: f64,
    /// Largest predicted mass kept (GeV).
    #[arg(long, default_value_t = 1e20)]
    pub max_mass: f64,
    /// Also write the table as `predictions.csv`.
    #[arg(long)]
    pub csv: bool,
    /// Also enumerate unseen basis triples into `lattice.json`.
    #[arg(long)]
    pub lattice: bool,
    /// Keep this many lattice candidates.
    #[arg(long, default_value_t = 10)]
    pub lattice_limit: usize,
}

pub fn run(args: &PredictArgs) -> Result<(), Box<dyn Error>> {
    let spec: FitSpec = read_yaml(args.spec.as_deref())?;
    let (set, reference) = args.input.load()?;
    let exponents = quantize_all(&set.records, &reference)?;
    let outcome = run_fit(&spec, &set.records, &exponents)?;
    let model = StateModel::from_fit(&outcome.report, OutputScale::for_target(&spec.target)?)?;
    let space = StateSpace::default();
    let table = predict(
        &model,
        &space,
        &reference,
        &MassWindow::new(args.min_mass, args.max_mass),
    )?;
    let best = best_assignments(&model, &space, &exponents)?;

    write_json(args.out.join("predictions.json"), &table)?;
    write_json(args.out.join("best_assignments.json"), &best)?;
    if args.csv {
        write_csv(&args.out.join("predictions.csv"), &table)?;
    }
    if args.lattice {
        let decompositions = decompose_all(&exponents.entries, &DecomposeOpts::default());
        let opts = LatticeOpts {
            limit: Some(args.lattice_limit),
            ..LatticeOpts::default()
        };
        let lattice = enumerate_lattice(&opts, &reference, &known_triples(&decompositions))?;
        write_json(args.out.join("lattice.json"), &lattice)?;
    }

    println!(
        "gmq predict: {} states kept, {} out of window, {} non-finite",
        table.rows.len(),
        table.dropped_out_of_window,
        table.dropped_non_finite
    );
    Ok(())
}

fn write_csv(path: &Path, table: &PredictionTable) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = csv::Writer::from_path(path)?;
    file.write_record(["label", "dim", "weight", "exponent", "code", "mass_gev"])?;
    for row in &table.rows {
        file.write_record([
            row.label.clone(),
            row.dim.to_string(),
            row.weight.to_string(),
            row.exponent.to_string(),
            row.code.to_string(),
            format!("{:e}", row.mass),
        ])?;
    }
    file.flush()?;
    Ok(())
}
