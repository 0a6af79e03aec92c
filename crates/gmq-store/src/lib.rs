//! Particle record store: SQLite tables, record files and the built-in dataset.

pub mod files;
pub mod schema;
pub mod standard_model;

use std::path::Path;

use gmq_core::errors::{ErrorInfo, GmqError};
use rusqlite::Connection;

pub use files::{load_record_file, validate_records, write_record_file};
pub use schema::{
    count_particles, init_schema, load_particles, upsert_particle, upsert_particles, RecordSet,
};
pub use standard_model::standard_model;

/// Opens (creating if needed) a store database and ensures its schema.
pub fn open_store(path: &Path) -> Result<Connection, GmqError> {
    let conn = Connection::open(path).map_err(|err| {
        GmqError::Store(
            ErrorInfo::new("gmq_store.open", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Loads records from either a SQLite database or a JSON/YAML record file.
pub fn load_records(path: &Path) -> Result<RecordSet, GmqError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") | Some("yaml") | Some("yml") => load_record_file(path),
        _ => {
            let conn = open_store(path)?;
            load_particles(&conn)
        }
    }
}
