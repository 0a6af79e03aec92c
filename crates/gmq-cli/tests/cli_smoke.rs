use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn gmq(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gmq"))
        .args(args)
        .output()
        .expect("run gmq")
}

fn read_json(path: &Path) -> Value {
    let bytes = fs::read(path).expect("artefact");
    serde_json::from_slice(&bytes).expect("json")
}

#[test]
fn quantize_writes_exponents_for_builtin_dataset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().to_str().expect("utf8 path");
    let output = gmq(&["quantize", "--out", out]);
    assert!(output.status.success(), "quantize failed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    assert!(stdout.starts_with("gmq quantize: 15 records, 2 failures"));

    let report = read_json(&dir.path().join("exponents.json"));
    let entries = report["entries"].as_array().expect("entries");
    let muon = entries
        .iter()
        .find(|entry| entry["name"] == "muon")
        .expect("muon entry");
    assert_eq!(muon["q"], 44);
    assert!(dir.path().join("diagnostics.json").exists());
}

#[test]
fn init_db_then_decompose_from_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("particles.db");
    let db_arg = db.to_str().expect("utf8 path");
    let output = gmq(&["init-db", "--db", db_arg]);
    assert!(output.status.success(), "init-db failed: {output:?}");

    let out = dir.path().join("decomp");
    let output = gmq(&[
        "decompose",
        "--records",
        db_arg,
        "--limit",
        "1",
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success(), "decompose failed: {output:?}");
    let report = read_json(&out.join("decompositions.json"));
    let entries = report["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 15);
    assert!(entries
        .iter()
        .all(|entry| entry["decomposition"]["hits"].as_array().map_or(0, Vec::len) <= 1));
    assert!(out.join("patterns.json").exists());
}

#[test]
fn predict_writes_table_and_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = gmq(&[
        "predict",
        "--out",
        dir.path().to_str().expect("utf8 path"),
        "--csv",
        "--lattice",
        "--lattice-limit",
        "3",
    ]);
    assert!(output.status.success(), "predict failed: {output:?}");
    let table = read_json(&dir.path().join("predictions.json"));
    let rows = table["rows"].as_array().expect("rows").len();
    let csv = fs::read_to_string(dir.path().join("predictions.csv")).expect("csv");
    assert_eq!(csv.lines().count(), rows + 1);
    assert!(csv.starts_with("label,dim,weight,exponent,code,mass_gev"));
    let lattice = read_json(&dir.path().join("lattice.json"));
    assert!(lattice["candidates"].as_array().expect("candidates").len() <= 3);
}

#[test]
fn run_uses_plan_and_unknown_reference_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan = dir.path().join("plan.yaml");
    fs::write(&plan, "fits:\n  casimir:\n    features: [casimir, weight]\nprediction:\n  fit: casimir\n")
        .expect("plan");
    let out = dir.path().join("out");
    let output = gmq(&[
        "run",
        "--plan",
        plan.to_str().expect("utf8 path"),
        "--out",
        out.to_str().expect("utf8 path"),
    ]);
    assert!(output.status.success(), "run failed: {output:?}");
    let report = read_json(&out.join("analysis_report.json"));
    assert_eq!(report["prediction"]["fit"], "casimir");

    let output = gmq(&[
        "fit",
        "--reference",
        "graviton",
        "--out",
        dir.path().to_str().expect("utf8 path"),
    ]);
    assert!(!output.status.success());
}
