use gmq_core::{Category, GmqError, ParticleRecord, ReferenceScale};
use gmq_fit::{
    run_fit, Assignment, AssignmentMap, AssignmentRule, DesignBuilder, Feature, FitSpec, Target,
    WeightRule,
};
use gmq_quant::quantize_all;
use gmq_store::standard_model;

fn electron_reference() -> ReferenceScale {
    ReferenceScale::from_records(&standard_model(), "electron").expect("electron reference")
}

fn record(name: &str, category: Category) -> ParticleRecord {
    ParticleRecord::new(name, 1.0, category)
}

#[test]
fn assignment_rejects_unknown_labels() {
    assert!(Assignment::new(4, 3).is_ok());
    let err = Assignment::new(2, 0).expect_err("dim 2");
    assert_eq!(err.info().code, "assign_dim");
    let err = Assignment::new(3, 2).expect_err("weight 2 in 3D");
    assert_eq!(err.info().code, "assign_weight");
    assert_eq!(Assignment::new(5, 0).expect("5D").casimir(), 24.0);
}

#[test]
fn code_modulo_picks_weight_from_code_residue() {
    let map = AssignmentMap::code_modulo();
    let up = map.resolve(&record("up", Category::Quark), 12).expect("up");
    assert_eq!(up, Assignment { dim: 3, weight: -1 });
    let strange = map.resolve(&record("strange", Category::Quark), 44).expect("strange");
    assert_eq!(strange, Assignment { dim: 3, weight: 1 });
    let muon = map.resolve(&record("muon", Category::Lepton), 44).expect("muon");
    assert_eq!(muon, Assignment { dim: 4, weight: -3 });
    let nu = map
        .resolve(&record("tau_neutrino", Category::Lepton), -162)
        .expect("neutrino");
    assert_eq!(nu, Assignment { dim: 1, weight: 0 });
    let higgs = map.resolve(&record("higgs", Category::Boson), 103).expect("higgs");
    assert_eq!(higgs, Assignment { dim: 5, weight: 1 });
    // Negative codes use the non-negative remainder.
    let odd = map.resolve(&record("odd", Category::Other), -1).expect("negative code");
    assert_eq!(odd, Assignment { dim: 5, weight: 2 });
}

#[test]
fn table_wins_over_rules_and_missing_is_config_error() {
    let mut map = AssignmentMap::casimir_table();
    assert_eq!(
        map.resolve(&record("muon", Category::Lepton), 0).expect("muon"),
        Assignment { dim: 4, weight: -3 }
    );
    let err = map
        .resolve(&record("axion", Category::Other), 7)
        .expect_err("no entry");
    assert!(matches!(err, GmqError::Config(_)));
    assert_eq!(err.info().code, "assign_missing");

    map.rules.push(AssignmentRule {
        name: None,
        name_contains: Some("ax".to_string()),
        category: None,
        dim: 3,
        weight: WeightRule::Fixed(0),
    });
    assert_eq!(
        map.resolve(&record("axion", Category::Other), 7).expect("rule"),
        Assignment { dim: 3, weight: 0 }
    );
    map.rules.push(AssignmentRule {
        name: None,
        name_contains: None,
        category: None,
        dim: 6,
        weight: WeightRule::CodeModulo,
    });
    assert_eq!(map.validate().expect_err("dim 6").info().code, "assign_dim");
}

#[test]
fn features_and_targets_parse_from_strings() {
    assert_eq!("dim".parse::<Feature>().expect("dim"), Feature::Dim);
    assert_eq!(
        "category:quark".parse::<Feature>().expect("category"),
        Feature::Category(Category::Quark)
    );
    assert_eq!(
        "extra:color".parse::<Feature>().expect("extra"),
        Feature::Extra("color".to_string())
    );
    assert!("mass".parse::<Feature>().is_err());
    let typo = "category:qurk".parse::<Feature>().expect_err("misspelt category");
    assert_eq!(typo.info().code, "fit_feature");
    assert_eq!(typo.info().message, "unknown category");
    assert!("category:scalar".parse::<Feature>().is_err());
    assert_eq!("q".parse::<Target>().expect("q"), Target::Code);
    assert_eq!("n-raw".parse::<Target>().expect("n-raw"), Target::RawExponent);
    assert_eq!(Target::default().to_string(), "quantized-exponent");
    assert!("extra:".parse::<Target>().is_err());
}

#[test]
fn design_skips_records_missing_features() {
    let records = standard_model();
    let reference = electron_reference();
    let exponents = quantize_all(&records, &reference).expect("quantize");
    let builder = DesignBuilder::new(
        vec![Feature::Extra("color".to_string()), Feature::Generation],
        Target::Code,
    )
    .expect("builder");
    let design = builder.build(&records, &exponents, &AssignmentMap::default());
    assert_eq!(design.sample_names, vec!["up", "down", "charm", "strange", "top", "bottom"]);
    assert_eq!(design.rows[4], vec![3.0, 3.0]);
    assert_eq!(design.targets[4], 106.0);
    assert!(design.assignments.iter().all(Option::is_none));
    // Leptons lack color; bosons lack color and generation.
    assert_eq!(design.failures.len(), 9);
    assert!(design.failures.iter().all(|f| f.stage == "design"));
    assert!(DesignBuilder::new(Vec::new(), Target::Code).is_err());
}

#[test]
fn standard_model_fit_uses_every_quantized_record() {
    let records = standard_model();
    let exponents = quantize_all(&records, &electron_reference()).expect("quantize");
    assert_eq!(exponents.failures.len(), 2);

    let outcome = run_fit(&FitSpec::default(), &records, &exponents).expect("fit");
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.report.predictions.len(), 15);
    assert_eq!(outcome.assignments.len(), 15);
    assert_eq!(outcome.report.feature_names, vec!["dim", "weight", "intercept"]);
    assert_eq!(outcome.report.rank, 3);
    assert!(outcome.report.coefficients.iter().all(|c| c.is_finite()));

    let table = FitSpec {
        features: vec![Feature::Casimir, Feature::Weight],
        assignments: AssignmentMap::casimir_table(),
        ..FitSpec::default()
    };
    let outcome = run_fit(&table, &records, &exponents).expect("casimir fit");
    let electron = outcome
        .assignments
        .iter()
        .find(|sample| sample.name == "electron")
        .expect("electron assigned");
    assert_eq!(electron.assignment, Assignment { dim: 3, weight: -1 });
}

#[test]
fn fit_without_rows_is_an_error() {
    let records = vec![ParticleRecord::new("electron", 0.000_511, Category::Lepton)];
    let reference = ReferenceScale::new("electron", 0.000_511).expect("reference");
    let exponents = quantize_all(&records, &reference).expect("quantize");
    let spec = FitSpec {
        assignments: AssignmentMap::default(),
        ..FitSpec::default()
    };
    let err = run_fit(&spec, &records, &exponents).expect_err("no rows");
    assert_eq!(err.info().code, "fit_no_samples");
}

#[test]
fn fit_spec_yaml_fills_defaults() {
    let spec: FitSpec = serde_yaml::from_str("target: code\nintercept: false\n").expect("yaml");
    assert_eq!(spec.features, vec![Feature::Dim, Feature::Weight]);
    assert_eq!(spec.target, Target::Code);
    assert!(!spec.solver.intercept);
    assert_eq!(spec.solver.integer_tolerance, 0.1);
    assert_eq!(spec.assignments, AssignmentMap::code_modulo());

    let spec: FitSpec = serde_yaml::from_str(
        "features: [casimir, \"category:boson\"]\nassignments:\n  table:\n    muon: {dim: 4, weight: -3}\n  rules:\n    - category: quark\n      dim: 3\n      weight: code-modulo\n",
    )
    .expect("yaml with table");
    assert_eq!(spec.features[1], Feature::Category(Category::Boson));
    assert_eq!(spec.assignments.table["muon"], Assignment { dim: 4, weight: -3 });
    assert_eq!(spec.assignments.rules[0].weight, WeightRule::CodeModulo);
}
