use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use gmq_core::errors::{ErrorInfo, GmqError, RecordFailure};
use gmq_core::serde::{from_json_slice, from_yaml_slice, to_canonical_json_pretty, to_yaml_string};
use gmq_core::ParticleRecord;
use serde::{Deserialize, Serialize};

use crate::schema::RecordSet;

/// On-disk layout of a record file: either a bare list or `{ particles: [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Wrapped { particles: Vec<ParticleRecord> },
    Bare(Vec<ParticleRecord>),
}

impl RecordFile {
    fn into_records(self) -> Vec<ParticleRecord> {
        match self {
            RecordFile::Wrapped { particles } => particles,
            RecordFile::Bare(particles) => particles,
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn io_error(code: &str, err: impl ToString, path: &Path) -> GmqError {
    GmqError::Store(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Reads records from a `.json`, `.yaml` or `.yml` file.
///
/// Entries that parse but break a record rule land in `failures`.
pub fn load_record_file(path: &Path) -> Result<RecordSet, GmqError> {
    let bytes = fs::read(path).map_err(|err| io_error("gmq_store.read", err, path))?;
    let file: RecordFile = if is_yaml(path) {
        from_yaml_slice(&bytes)?
    } else {
        from_json_slice(&bytes)?
    };
    Ok(validate_records(file.into_records()))
}

/// Applies the store's record rules: spin is non-negative and names are
/// unique (the first entry with a name wins).
pub fn validate_records(records: Vec<ParticleRecord>) -> RecordSet {
    let mut seen = BTreeSet::new();
    let mut set = RecordSet::default();
    for record in records {
        let failure = if record.spin.is_negative() {
            Some(
                ErrorInfo::new("gmq_store.spin", "spin must be non-negative")
                    .with_context("spin", record.spin.to_string()),
            )
        } else if seen.contains(&record.name) {
            Some(ErrorInfo::new("gmq_store.duplicate_name", "name already loaded"))
        } else {
            None
        };
        match failure {
            Some(info) => {
                let info = info.with_context("name", &record.name);
                set.failures
                    .push(RecordFailure::new(record.name, "load", GmqError::Store(info)));
            }
            None => {
                seen.insert(record.name.clone());
                set.records.push(record);
            }
        }
    }
    set
}

/// Writes records in the wrapped layout, choosing the format from the extension.
pub fn write_record_file(path: &Path, records: &[ParticleRecord]) -> Result<(), GmqError> {
    let file = RecordFile::Wrapped {
        particles: records.to_vec(),
    };
    let bytes = if is_yaml(path) {
        to_yaml_string(&file)?.into_bytes()
    } else {
        to_canonical_json_pretty(&file)?
    };
    fs::write(path, bytes).map_err(|err| io_error("gmq_store.write", err, path))
}
