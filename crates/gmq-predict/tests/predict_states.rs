use gmq_core::{Category, GmqError, ParticleRecord, ReferenceScale, PHI};
use gmq_fit::{fit_least_squares, LstsqOpts, Target};
use gmq_predict::{
    best_assignments, nearest_states, predict, MassWindow, NearestOpts, OutputScale, StateGroup,
    StateModel, StateSpace,
};
use gmq_quant::quantize_all;

const ELECTRON: f64 = 0.000_511;

fn reference() -> ReferenceScale {
    ReferenceScale::new("electron", ELECTRON).expect("reference")
}

// n = 2 dim + 0.5 weight - 1
fn linear_model() -> StateModel {
    StateModel {
        dim: 2.0,
        weight: 0.5,
        casimir: 0.0,
        intercept: -1.0,
        scale: OutputScale::Exponent,
    }
}

#[test]
fn default_space_has_thirteen_states() {
    let states = StateSpace::default().states().expect("states");
    assert_eq!(states.len(), 13);
    assert_eq!(states[0].label, "1D");
    assert_eq!(states.iter().filter(|s| s.label == "5D").count(), 5);

    let bad = StateSpace {
        groups: vec![StateGroup {
            label: "2D".to_string(),
            dim: 2,
            weights: vec![0],
        }],
    };
    let err = bad.states().expect_err("dim 2");
    assert!(matches!(err, GmqError::Config(_)));
    assert_eq!(err.info().context["label"], "2D");
}

#[test]
fn model_reads_fit_coefficients() {
    let rows: Vec<Vec<f64>> = StateSpace::default()
        .states()
        .expect("states")
        .iter()
        .map(|s| vec![f64::from(s.assignment.dim), s.assignment.weight as f64])
        .collect();
    let targets: Vec<f64> = rows.iter().map(|r| 2.0 * r[0] + 0.5 * r[1] - 1.0).collect();
    let names: Vec<String> = (0..rows.len()).map(|i| format!("s{i}")).collect();
    let features = vec!["dim".to_string(), "weight".to_string()];
    let report =
        fit_least_squares(&names, &features, &rows, &targets, &LstsqOpts::default()).expect("fit");
    let model = StateModel::from_fit(&report, OutputScale::Exponent).expect("model");
    assert!((model.dim - 2.0).abs() < 1e-8);
    assert!((model.weight - 0.5).abs() < 1e-8);
    assert!((model.intercept + 1.0).abs() < 1e-8);
    assert_eq!(model.casimir, 0.0);

    let features = vec!["charge".to_string()];
    let rows = vec![vec![1.0], vec![2.0]];
    let names = vec!["a".to_string(), "b".to_string()];
    let report =
        fit_least_squares(&names, &features, &rows, &[1.0, 2.0], &LstsqOpts::default()).expect("fit");
    let err = StateModel::from_fit(&report, OutputScale::Exponent).expect_err("charge column");
    assert_eq!(err.info().code, "predict_feature");
}

#[test]
fn output_scale_follows_fit_target() {
    assert_eq!(OutputScale::for_target(&Target::Code).expect("code"), OutputScale::Code);
    assert_eq!(
        OutputScale::for_target(&Target::RawExponent).expect("raw"),
        OutputScale::Exponent
    );
    assert!(OutputScale::for_target(&Target::Extra("color".to_string())).is_err());
}

#[test]
fn table_is_sorted_by_mass_with_label_ties() {
    let table = predict(
        &linear_model(),
        &StateSpace::default(),
        &reference(),
        &MassWindow::default(),
    )
    .expect("predict");
    assert_eq!(table.rows.len(), 13);
    assert_eq!(table.dropped_non_finite, 0);
    assert_eq!(table.dropped_out_of_window, 0);
    assert_eq!(table.rows[0].label, "1D");
    assert!((table.rows[0].exponent - 1.0).abs() < 1e-12);
    assert!((table.rows[0].mass - ELECTRON * PHI).abs() < 1e-15);
    assert!(table.rows.windows(2).all(|w| w[0].mass <= w[1].mass));

    // (3, 1) and (4, -3) both predict 5.5; the label breaks the tie.
    let pos = |dim, weight| {
        table
            .rows
            .iter()
            .position(|row| row.dim == dim && row.weight == weight)
            .expect("row")
    };
    assert_eq!(pos(4, -3), pos(3, 1) + 1);
    let row = table.row(5, 2).expect("5D top weight");
    assert!((row.code - 40.0).abs() < 1e-12);
}

#[test]
fn window_and_overflow_drop_rows() {
    let table = predict(
        &linear_model(),
        &StateSpace::default(),
        &reference(),
        &MassWindow::new(0.0, 0.01),
    )
    .expect("predict");
    assert_eq!(table.rows.len(), 5);
    assert_eq!(table.dropped_out_of_window, 8);

    let runaway = StateModel {
        intercept: 1.0e6,
        ..linear_model()
    };
    let table = predict(&runaway, &StateSpace::default(), &reference(), &MassWindow::default())
        .expect("predict");
    assert!(table.rows.is_empty());
    assert_eq!(table.dropped_non_finite, 13);

    let err = predict(
        &linear_model(),
        &StateSpace::default(),
        &reference(),
        &MassWindow::new(1.0, 0.5),
    )
    .expect_err("inverted window");
    assert_eq!(err.info().code, "predict_window");

    let bad_reference = ReferenceScale {
        name: "electron".to_string(),
        mass: 0.0,
    };
    let err = predict(
        &linear_model(),
        &StateSpace::default(),
        &bad_reference,
        &MassWindow::default(),
    )
    .expect_err("reference");
    assert!(matches!(err, GmqError::MissingReference(_)));
}

#[test]
fn prediction_is_idempotent() {
    let run = || {
        predict(
            &linear_model(),
            &StateSpace::default(),
            &reference(),
            &MassWindow::default(),
        )
        .expect("predict")
    };
    assert_eq!(run(), run());
}

#[test]
fn code_scale_divides_by_four() {
    let model = StateModel {
        dim: 0.0,
        weight: 0.0,
        casimir: 0.0,
        intercept: 4.0,
        scale: OutputScale::Code,
    };
    let table = predict(&model, &StateSpace::default(), &reference(), &MassWindow::default())
        .expect("predict");
    assert!(table.rows.iter().all(|row| (row.exponent - 1.0).abs() < 1e-12));
    assert!(table.rows.iter().all(|row| (row.code - 4.0).abs() < 1e-12));
    // Equal masses fall back to label, dim, weight.
    assert_eq!(table.rows[0].label, "1D");
    assert_eq!((table.rows[1].dim, table.rows[1].weight), (3, -1));
}

#[test]
fn nearest_and_best_states_for_a_record() {
    let records = vec![ParticleRecord::new("x", ELECTRON * PHI.powi(5), Category::Other)];
    let exponents = quantize_all(&records, &reference()).expect("quantize");
    assert_eq!(exponents.entries[0].q, 20);

    let table = predict(
        &linear_model(),
        &StateSpace::default(),
        &reference(),
        &MassWindow::default(),
    )
    .expect("predict");
    let nearest = nearest_states(&table, &exponents, &NearestOpts { radius: 0.6, k: 3 })
        .expect("nearest");
    let picked: Vec<(u8, i64)> = nearest[0]
        .matches
        .iter()
        .map(|m| (m.dim, m.weight))
        .collect();
    assert_eq!(picked, vec![(3, 0), (3, -1), (3, 1)]);
    assert!(nearest[0].matches[0].distance < 1e-12);

    let err = nearest_states(&table, &exponents, &NearestOpts { radius: 0.0, k: 3 })
        .expect_err("radius");
    assert_eq!(err.info().code, "predict_radius");

    let best = best_assignments(&linear_model(), &StateSpace::default(), &exponents)
        .expect("best");
    assert_eq!(best.len(), 1);
    assert_eq!((best[0].dim, best[0].weight), (3, 0));
    assert!(best[0].error < 1e-12);
}

mod props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_model_gives_sorted_repeatable_tables(
            dim in -20.0f64..20.0,
            weight in -5.0f64..5.0,
            casimir in -1.0f64..1.0,
            intercept in -50.0f64..50.0,
        ) {
            let model = StateModel { dim, weight, casimir, intercept, scale: OutputScale::Exponent };
            let first = predict(&model, &StateSpace::default(), &reference(), &MassWindow::default())
                .expect("predict");
            let second = predict(&model, &StateSpace::default(), &reference(), &MassWindow::default())
                .expect("predict");
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(
                first.rows.len() + first.dropped_non_finite + first.dropped_out_of_window,
                13
            );
            prop_assert!(first.rows.windows(2).all(|w| w[0].mass <= w[1].mass));
        }
    }
}
