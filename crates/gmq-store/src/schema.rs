use std::collections::BTreeMap;

use chrono::Utc;
use gmq_core::errors::{ErrorInfo, GmqError, RecordFailure};
use gmq_core::rational::MAX_APPROX_DENOMINATOR;
use gmq_core::{Category, ParticleRecord, Rational};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: i64 = 1;

/// Records loaded from a store together with the rows that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    pub records: Vec<ParticleRecord>,
    #[serde(default)]
    pub failures: Vec<RecordFailure>,
}

impl RecordSet {
    pub fn from_records(records: Vec<ParticleRecord>) -> Self {
        Self {
            records,
            failures: Vec::new(),
        }
    }
}

struct ParticleRow {
    name: String,
    mass: f64,
    mass_error: Option<f64>,
    charge: f64,
    spin: f64,
    category: String,
    generation: Option<i64>,
    quantum_numbers: Option<String>,
}

fn store_error(code: &str, err: impl ToString) -> GmqError {
    GmqError::Store(ErrorInfo::new(code, err.to_string()))
}

pub fn init_schema(conn: &Connection) -> Result<(), GmqError> {
    conn.execute_batch(
        "BEGIN;
        CREATE TABLE IF NOT EXISTS meta(version INTEGER NOT NULL, created_at TEXT NOT NULL);
        CREATE TABLE IF NOT EXISTS particles(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            mass_gev REAL NOT NULL,
            mass_error_gev REAL,
            charge REAL NOT NULL DEFAULT 0,
            spin REAL NOT NULL DEFAULT 0,
            category TEXT NOT NULL,
            generation INTEGER,
            quantum_numbers TEXT
        );
        COMMIT;",
    )
    .map_err(|err| store_error("gmq_store.schema", err))?;
    set_version(conn, SCHEMA_VERSION)
}

fn set_version(conn: &Connection, version: i64) -> Result<(), GmqError> {
    let existing: Option<i64> = conn
        .query_row("SELECT version FROM meta LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(|err| store_error("gmq_store.schema", err))?;
    match existing {
        Some(current) if current == version => Ok(()),
        Some(current) => Err(store_error(
            "gmq_store.schema_version",
            format!("store schema {current} incompatible with expected {version}"),
        )),
        None => {
            conn.execute(
                "INSERT INTO meta(version, created_at) VALUES (?, ?)",
                params![version, Utc::now().to_rfc3339()],
            )
            .map_err(|err| store_error("gmq_store.schema", err))?;
            Ok(())
        }
    }
}

/// Inserts or replaces a record keyed by name.
pub fn upsert_particle(conn: &Connection, record: &ParticleRecord) -> Result<(), GmqError> {
    let quantum_numbers = if record.extra.is_empty() {
        None
    } else {
        Some(
            serde_json::to_string(&record.extra)
                .map_err(|err| store_error("gmq_store.quantum_numbers", err))?,
        )
    };
    conn.execute(
        "INSERT OR REPLACE INTO particles
            (name, mass_gev, mass_error_gev, charge, spin, category, generation, quantum_numbers)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            record.name,
            record.mass,
            record.mass_error,
            record.charge.to_f64(),
            record.spin.to_f64(),
            record.category.as_str(),
            record.generation.map(i64::from),
            quantum_numbers,
        ],
    )
    .map_err(|err| {
        GmqError::Store(
            ErrorInfo::new("gmq_store.insert", err.to_string()).with_context("name", &record.name),
        )
    })?;
    Ok(())
}

/// Inserts a batch of records inside one transaction.
pub fn upsert_particles(conn: &mut Connection, records: &[ParticleRecord]) -> Result<usize, GmqError> {
    let tx = conn
        .transaction()
        .map_err(|err| store_error("gmq_store.transaction", err))?;
    for record in records {
        upsert_particle(&tx, record)?;
    }
    tx.commit()
        .map_err(|err| store_error("gmq_store.transaction", err))?;
    Ok(records.len())
}

pub fn count_particles(conn: &Connection) -> Result<usize, GmqError> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM particles", [], |row| row.get(0))
        .map_err(|err| store_error("gmq_store.query", err))?;
    Ok(count.max(0) as usize)
}

/// Loads every particle in insertion order. Rows that cannot be read, or whose
/// stored charge, spin or quantum numbers cannot be interpreted, are reported
/// as failures.
pub fn load_particles(conn: &Connection) -> Result<RecordSet, GmqError> {
    let mut stmt = conn
        .prepare(
            "SELECT name, mass_gev, mass_error_gev, charge, spin, category, generation, quantum_numbers
             FROM particles ORDER BY id",
        )
        .map_err(|err| store_error("gmq_store.query", err))?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ParticleRow {
                name: row.get(0)?,
                mass: row.get(1)?,
                mass_error: row.get(2)?,
                charge: row.get(3)?,
                spin: row.get(4)?,
                category: row.get(5)?,
                generation: row.get(6)?,
                quantum_numbers: row.get(7)?,
            })
        })
        .map_err(|err| store_error("gmq_store.query", err))?;

    let mut set = RecordSet::default();
    for (index, row) in rows.enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(err) => {
                set.failures.push(RecordFailure::new(
                    format!("row {index}"),
                    "load",
                    store_error("gmq_store.row", err),
                ));
                continue;
            }
        };
        let name = row.name.clone();
        match row_to_record(row) {
            Ok(record) => set.records.push(record),
            Err(error) => set.failures.push(RecordFailure::new(name, "load", error)),
        }
    }
    Ok(set)
}

fn row_to_record(row: ParticleRow) -> Result<ParticleRecord, GmqError> {
    let rational = |column: &str, value: f64| {
        Rational::approximate(value, MAX_APPROX_DENOMINATOR).ok_or_else(|| {
            GmqError::Store(
                ErrorInfo::new("gmq_store.rational", "column is not a small fraction")
                    .with_context("name", &row.name)
                    .with_context("column", column)
                    .with_context("value", value.to_string()),
            )
        })
    };
    let charge = rational("charge", row.charge)?;
    let spin = rational("spin", row.spin)?;
    if spin.is_negative() {
        return Err(GmqError::Store(
            ErrorInfo::new("gmq_store.spin", "spin must be non-negative")
                .with_context("name", &row.name),
        ));
    }
    let generation = match row.generation {
        None | Some(0) => None,
        Some(value) => Some(u8::try_from(value).map_err(|_| {
            GmqError::Store(
                ErrorInfo::new("gmq_store.generation", "generation out of range")
                    .with_context("name", &row.name)
                    .with_context("value", value.to_string()),
            )
        })?),
    };
    let extra = match &row.quantum_numbers {
        Some(text) => parse_quantum_numbers(text).map_err(|err| {
            GmqError::Store(
                ErrorInfo::new("gmq_store.quantum_numbers", err.to_string())
                    .with_context("name", &row.name),
            )
        })?,
        None => BTreeMap::new(),
    };
    Ok(ParticleRecord {
        name: row.name,
        mass: row.mass,
        mass_error: row.mass_error,
        category: Category::from_label(&row.category),
        generation,
        charge,
        spin,
        extra,
    })
}

/// Keeps the numeric entries of a quantum-number JSON object.
fn parse_quantum_numbers(text: &str) -> Result<BTreeMap<String, f64>, serde_json::Error> {
    let object: BTreeMap<String, serde_json::Value> = serde_json::from_str(text)?;
    Ok(object
        .into_iter()
        .filter_map(|(key, value)| value.as_f64().map(|number| (key, number)))
        .collect())
}
