use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use gmq_core::serde::{from_yaml_slice, to_canonical_json_pretty};
use gmq_core::{ReferenceScale, DEFAULT_REFERENCE};
use gmq_store::{load_records, standard_model, RecordSet};
use serde::de::DeserializeOwned;

use commands::{
    decompose::{self, DecomposeArgs},
    fit::{self, FitArgs},
    init_db::{self, InitDbArgs},
    predict::{self, PredictArgs},
    quantize::{self, QuantizeArgs},
    run::{self, RunArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "gmq", about = "Golden-ratio mass quantization CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a SQLite record store and fill it.
    InitDb(InitDbArgs),
    /// Quantize record masses onto the quarter-step exponent grid.
    Quantize(QuantizeArgs),
    /// Decompose integer codes over the 8/15/24 basis.
    Decompose(DecomposeArgs),
    /// Fit exponents against assigned labels.
    Fit(FitArgs),
    /// Predict masses for every state of a fitted model.
    Predict(PredictArgs),
    /// Execute a full analysis plan.
    Run(RunArgs),
}

/// Record source and reference shared by the analysis commands.
#[derive(ClapArgs, Debug)]
pub struct InputArgs {
    /// Record store (SQLite) or record file (.json/.yaml). Built-in dataset when omitted.
    #[arg(long)]
    pub records: Option<PathBuf>,
    /// Name of the reference record.
    #[arg(long, default_value = DEFAULT_REFERENCE)]
    pub reference: String,
}

impl InputArgs {
    /// Loads records and resolves the reference among them.
    pub fn load(&self) -> Result<(RecordSet, ReferenceScale), Box<dyn Error>> {
        let set = match &self.records {
            Some(path) => load_records(path)?,
            None => RecordSet::from_records(standard_model()),
        };
        let reference = ReferenceScale::from_records(&set.records, &self.reference)?;
        Ok((set, reference))
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::InitDb(args) => init_db::run(&args),
        Command::Quantize(args) => quantize::run(&args),
        Command::Decompose(args) => decompose::run(&args),
        Command::Fit(args) => fit::run(&args),
        Command::Predict(args) => predict::run(&args),
        Command::Run(args) => run::run(&args),
    }
}

fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = to_canonical_json_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_yaml<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, Box<dyn Error>> {
    match path {
        Some(path) => Ok(from_yaml_slice(&fs::read(path)?)?),
        None => Ok(T::default()),
    }
}
