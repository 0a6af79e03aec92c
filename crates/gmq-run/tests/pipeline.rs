use std::fs;

use gmq_core::GmqError;
use gmq_fit::Target;
use gmq_run::{load_plan, run_analysis, run_plan, run_plan_from_path, AnalysisPlan, DEFAULT_FIT};
use gmq_store::{standard_model, write_record_file};

#[test]
fn default_plan_runs_every_stage() {
    let plan = AnalysisPlan::default();
    let report = run_analysis(&plan, &standard_model(), Vec::new()).expect("analysis");

    assert_eq!(report.exponents.entries.len(), 15);
    let quantize_failures: Vec<&str> = report
        .failures_in("quantize")
        .map(|failure| failure.name.as_str())
        .collect();
    assert_eq!(quantize_failures, vec!["photon", "gluon"]);
    assert_eq!(report.decompositions.entries.len(), 15);
    assert!(report.fits.contains_key(DEFAULT_FIT));

    let prediction = report.prediction.as_ref().expect("prediction stage");
    assert_eq!(prediction.fit, DEFAULT_FIT);
    assert_eq!(
        prediction.table.rows.len()
            + prediction.table.dropped_non_finite
            + prediction.table.dropped_out_of_window,
        13
    );
    assert_eq!(prediction.best.len(), 15);
    assert!(report.lattice.is_none());

    assert_eq!(report.provenance.reference_name, "electron");
    assert_eq!(report.provenance.plan_hash.len(), 64);
    assert_eq!(report.provenance.plan_hash, plan.plan_hash().expect("hash"));
}

#[test]
fn failing_fit_and_prediction_do_not_abort() {
    let plan: AnalysisPlan = serde_yaml::from_str(
        "fits:\n  bad:\n    features: [\"extra:parity\"]\nprediction:\n  fit: missing\nlattice:\n  limit: 5\n",
    )
    .expect("plan yaml");
    let report = run_analysis(&plan, &standard_model(), Vec::new()).expect("analysis");

    assert!(report.fits.is_empty());
    let fit_failure = report.failures_in("fit").next().expect("fit failure");
    assert_eq!(fit_failure.name, "bad");
    assert_eq!(fit_failure.error.info().code, "fit_no_samples");
    let predict_failure = report.failures_in("predict").next().expect("predict failure");
    assert_eq!(predict_failure.error.info().code, "predict_fit_missing");
    assert!(report.prediction.is_none());

    let lattice = report.lattice.as_ref().expect("lattice stage");
    assert!(lattice.candidates.len() <= 5);
}

#[test]
fn unknown_reference_is_fatal() {
    let plan = AnalysisPlan {
        reference: "graviton".to_string(),
        ..AnalysisPlan::default()
    };
    let err = run_analysis(&plan, &standard_model(), Vec::new()).expect_err("no reference");
    assert!(matches!(err, GmqError::MissingReference(_)));
}

#[test]
fn plan_yaml_takes_defaults_and_resolves_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let plan_path = dir.path().join("plan.yaml");
    fs::write(
        &plan_path,
        "reference: muon\nrecords: particles.yaml\nfits:\n  code:\n    target: code\n    features: [casimir, weight]\nprediction: null\n",
    )
    .expect("write plan");
    let plan = load_plan(&plan_path).expect("load plan");

    assert_eq!(plan.reference, "muon");
    assert_eq!(plan.records_path(), Some(dir.path().join("particles.yaml")));
    assert_eq!(plan.fits["code"].target, Target::Code);
    assert!(plan.prediction.is_none());
    assert_eq!(plan.diagnostics.tolerance, 1e-3);
    assert_eq!(plan.decomposition.limit, None);

    let reloaded = load_plan(&plan_path).expect("reload");
    assert_eq!(plan.plan_hash().expect("hash"), reloaded.plan_hash().expect("hash"));
    let yaml = plan.to_yaml_string().expect("yaml");
    assert!(yaml.contains("reference: muon"));
}

#[test]
fn run_plan_writes_report_from_record_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_record_file(&dir.path().join("particles.json"), &standard_model()).expect("records");
    let plan_path = dir.path().join("plan.yaml");
    fs::write(&plan_path, "records: particles.json\n").expect("write plan");
    let out = dir.path().join("out");

    let report = run_plan_from_path(&plan_path, &out).expect("run");
    let bytes = fs::read(out.join("analysis_report.json")).expect("report file");
    let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(
        value["provenance"]["plan_hash"],
        serde_json::Value::String(report.provenance.plan_hash.clone())
    );
    assert_eq!(value["exponents"]["entries"].as_array().map(Vec::len), Some(15));

    let again = run_plan(&load_plan(&plan_path).expect("plan"), &out).expect("rerun");
    assert_eq!(again.provenance.input_hash, report.provenance.input_hash);
    assert_eq!(again.exponents, report.exponents);
}
