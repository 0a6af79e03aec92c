use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use gmq_core::errors::{ErrorInfo, GmqError, RecordFailure};
use gmq_core::hash::stable_hash_string;
use gmq_core::serde::to_canonical_json_bytes;
use gmq_core::{ParticleRecord, ReferenceScale};
use gmq_decomp::{decompose_all, summarize};
use gmq_fit::{run_fit, FitOutcome};
use gmq_predict::{
    best_assignments, enumerate_lattice, known_triples, nearest_states, predict, OutputScale,
    StateModel,
};
use gmq_quant::{diagnose, quantize_all, ExponentReport};
use gmq_store::{load_records, standard_model, RecordSet};

use crate::plan::{load_plan, AnalysisPlan, PredictionSpec};
use crate::report::{provenance, AnalysisReport, PredictionOutcome};

fn io_error(code: &str, err: impl ToString) -> GmqError {
    GmqError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Records named by the plan, or the built-in dataset.
pub fn load_plan_records(plan: &AnalysisPlan) -> Result<RecordSet, GmqError> {
    match plan.records_path() {
        Some(path) => load_records(&path),
        None => Ok(RecordSet::from_records(standard_model())),
    }
}

/// Runs every stage of the plan over `records`.
///
/// Only an unusable reference or plan is fatal. Per-record problems and
/// failing fits are collected in `failures` and the run continues.
pub fn run_analysis(
    plan: &AnalysisPlan,
    records: &[ParticleRecord],
    mut failures: Vec<RecordFailure>,
) -> Result<AnalysisReport, GmqError> {
    let plan_hash = plan.plan_hash()?;
    let input_hash = stable_hash_string(&records)?;
    let reference = ReferenceScale::from_records(records, &plan.reference)?;

    let exponents = quantize_all(records, &reference)?;
    failures.extend(exponents.failures.iter().cloned());
    let diagnostics = diagnose(&exponents, &plan.diagnostics);

    let decompositions = decompose_all(&exponents.entries, &plan.decomposition);
    failures.extend(decompositions.failures.iter().cloned());
    let patterns = summarize(&decompositions, records);

    let mut fits = BTreeMap::new();
    for (name, spec) in &plan.fits {
        match run_fit(spec, records, &exponents) {
            Ok(outcome) => {
                failures.extend(outcome.failures.iter().cloned().map(|failure| {
                    RecordFailure::new(failure.name, format!("fit:{name}"), failure.error)
                }));
                fits.insert(name.clone(), outcome);
            }
            Err(error) => failures.push(RecordFailure::new(name.clone(), "fit", error)),
        }
    }

    let prediction = match &plan.prediction {
        Some(spec) => match run_prediction(plan, spec, &fits, &reference, &exponents) {
            Ok(outcome) => Some(outcome),
            Err(error) => {
                failures.push(RecordFailure::new(spec.fit.clone(), "predict", error));
                None
            }
        },
        None => None,
    };

    let lattice = match &plan.lattice {
        Some(opts) => {
            let known = known_triples(&decompositions);
            match enumerate_lattice(opts, &reference, &known) {
                Ok(report) => Some(report),
                Err(error) => {
                    failures.push(RecordFailure::new("lattice", "lattice", error));
                    None
                }
            }
        }
        None => None,
    };

    Ok(AnalysisReport {
        provenance: provenance(input_hash, plan_hash, &reference),
        exponents,
        diagnostics,
        decompositions,
        patterns,
        fits,
        prediction,
        lattice,
        failures,
    })
}

fn run_prediction(
    plan: &AnalysisPlan,
    spec: &PredictionSpec,
    fits: &BTreeMap<String, FitOutcome>,
    reference: &ReferenceScale,
    exponents: &ExponentReport,
) -> Result<PredictionOutcome, GmqError> {
    let outcome = fits.get(&spec.fit).ok_or_else(|| {
        GmqError::Config(
            ErrorInfo::new("predict_fit_missing", "prediction names a fit that did not run")
                .with_context("fit", &spec.fit),
        )
    })?;
    let scale = match spec.scale {
        Some(scale) => scale,
        None => match plan.fits.get(&spec.fit) {
            Some(fit_spec) => OutputScale::for_target(&fit_spec.target)?,
            None => OutputScale::default(),
        },
    };
    let model = StateModel::from_fit(&outcome.report, scale)?;
    let table = predict(&model, &spec.states, reference, &spec.window)?;
    let nearest = nearest_states(&table, exponents, &spec.nearest)?;
    let best = best_assignments(&model, &spec.states, exponents)?;
    Ok(PredictionOutcome {
        fit: spec.fit.clone(),
        table,
        nearest,
        best,
    })
}

/// Loads the plan's records, runs the analysis and writes
/// `analysis_report.json` into `out`.
pub fn run_plan(plan: &AnalysisPlan, out: &Path) -> Result<AnalysisReport, GmqError> {
    fs::create_dir_all(out).map_err(|err| io_error("plan_out_dir", err))?;
    let RecordSet { records, failures } = load_plan_records(plan)?;
    let report = run_analysis(plan, &records, failures)?;
    let bytes = to_canonical_json_bytes(&report)?;
    fs::write(out.join("analysis_report.json"), bytes)
        .map_err(|err| io_error("analysis_report_write", err))?;
    Ok(report)
}

/// Loads a plan from disk and executes it.
pub fn run_plan_from_path(plan_path: &Path, out: &Path) -> Result<AnalysisReport, GmqError> {
    let plan = load_plan(plan_path)?;
    run_plan(&plan, out)
}
