use gmq_core::{Category, GmqError, ParticleRecord, ReferenceScale, PHI};
use gmq_quant::{exponent, mass_for_code, quantize, quantize_all, quantize_record};
use gmq_store::standard_model;

const ELECTRON: f64 = 0.000_510_998_946_1;

fn electron() -> ReferenceScale {
    ReferenceScale::new("electron", ELECTRON).expect("reference")
}

#[test]
fn reference_maps_to_zero() {
    let q = quantize(ELECTRON, &electron()).expect("quantize");
    assert_eq!(q.n_raw, 0.0);
    assert_eq!(q.n_quantized, 0.0);
    assert_eq!(q.q, 0);
}

#[test]
fn muon_lands_on_code_44() {
    let q = quantize(0.105_658_374_5, &electron()).expect("quantize");
    assert_eq!(q.q, 44);
    assert_eq!(q.n_quantized, 11.0);
    assert!((q.n_raw - 11.0).abs() < 0.1, "n_raw = {}", q.n_raw);
    assert!((q.residual() - 0.318).abs() < 1e-3);
}

#[test]
fn raw_exponent_matches_definition() {
    let mass = 1.776_86;
    let n = exponent(mass, &electron()).expect("exponent");
    assert_eq!(n, (mass / ELECTRON).ln() / PHI.ln());
}

#[test]
fn invalid_masses_are_rejected() {
    for mass in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = quantize(mass, &electron()).expect_err("invalid");
        assert!(matches!(err, GmqError::InvalidMass(_)), "{mass}: {err}");
    }
    let err = quantize(f64::MIN_POSITIVE / 1e10, &ReferenceScale {
        name: "huge".into(),
        mass: f64::MAX,
    })
    .expect_err("underflow");
    assert!(matches!(err, GmqError::InvalidMass(_)));
}

#[test]
fn invalid_reference_is_fatal() {
    let broken = ReferenceScale {
        name: "electron".into(),
        mass: 0.0,
    };
    let err = quantize(1.0, &broken).expect_err("reference");
    assert!(matches!(err, GmqError::MissingReference(_)));
    let err = quantize_all(&standard_model(), &broken).expect_err("batch");
    assert!(matches!(err, GmqError::MissingReference(_)));
}

#[test]
fn record_errors_carry_name() {
    let photon = ParticleRecord::new("photon", 0.0, Category::Boson);
    let err = quantize_record(&photon, &electron()).expect_err("massless");
    assert_eq!(err.info().context.get("name").map(String::as_str), Some("photon"));
}

#[test]
fn standard_model_codes() {
    let report = quantize_all(&standard_model(), &electron()).expect("batch");
    let expected = [
        ("electron", 0),
        ("electron_neutrino", -224),
        ("muon", 44),
        ("muon_neutrino", -180),
        ("tau", 68),
        ("tau_neutrino", -162),
        ("up", 12),
        ("down", 18),
        ("charm", 65),
        ("strange", 44),
        ("top", 106),
        ("bottom", 75),
        ("W", 99),
        ("Z", 101),
        ("higgs", 103),
    ];
    assert_eq!(report.entries.len(), expected.len());
    for (entry, (name, q)) in report.entries.iter().zip(expected) {
        assert_eq!(entry.name, name);
        assert_eq!(entry.q, q, "{name}");
        assert!(entry.residual.abs() <= 0.5);
    }
    let failed: Vec<_> = report.failures.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(failed, vec!["photon", "gluon"]);
    assert!(report.failures.iter().all(|f| f.stage == "quantize"));
}

#[test]
fn code_inverse_reconstructs_grid_mass() {
    let reference = electron();
    let report = quantize_all(&standard_model(), &reference).expect("batch");
    for entry in &report.entries {
        let rebuilt = mass_for_code(entry.q, &reference);
        assert!((rebuilt - entry.grid_mass).abs() <= 1e-12 * entry.grid_mass);
        // A quarter step is a factor phi^(1/8) at most away from the grid point.
        assert!(entry.relative_error < PHI.powf(0.125) - 1.0 + 1e-12);
    }
}

#[test]
fn report_round_trips_json() {
    let report = quantize_all(&standard_model(), &electron()).expect("batch");
    let json = serde_json::to_string(&report).expect("serialize");
    let decoded: gmq_quant::ExponentReport = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded.entries.len(), report.entries.len());
    for (lhs, rhs) in decoded.entries.iter().zip(&report.entries) {
        assert_eq!(lhs.name, rhs.name);
        assert_eq!(lhs.q, rhs.q);
        assert!((lhs.n_raw - rhs.n_raw).abs() < 1e-12);
    }
    assert_eq!(decoded.failures, report.failures);
}
