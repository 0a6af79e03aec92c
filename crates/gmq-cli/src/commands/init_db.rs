use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use gmq_store::{
    count_particles, load_record_file, open_store, standard_model, upsert_particles, RecordSet,
};

#[derive(Args, Debug)]
pub struct InitDbArgs {
    /// SQLite file to create or update.
    #[arg(long)]
    pub db: PathBuf,
    /// JSON or YAML record file to import instead of the built-in dataset.
    #[arg(long)]
    pub from: Option<PathBuf>,
}

pub fn run(args: &InitDbArgs) -> Result<(), Box<dyn Error>> {
    let set = match &args.from {
        Some(path) => load_record_file(path)?,
        None => RecordSet::from_records(standard_model()),
    };
    let mut conn = open_store(&args.db)?;
    let written = upsert_particles(&mut conn, &set.records)?;
    let total = count_particles(&conn)?;
    println!(
        "gmq init-db: wrote {written} records to {} ({total} total, {} skipped)",
        args.db.display(),
        set.failures.len()
    );
    Ok(())
}
