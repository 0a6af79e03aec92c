use gmq_core::{Category, ParticleRecord, Rational};
use gmq_store::{
    count_particles, load_particles, load_records, open_store, standard_model, upsert_particle,
    upsert_particles, write_record_file,
};
use rusqlite::{params, Connection};
use tempfile::{tempdir, NamedTempFile};

#[test]
fn standard_model_round_trips_through_sqlite() {
    let db = NamedTempFile::new().expect("db");
    let mut conn = open_store(db.path()).expect("open");
    let records = standard_model();
    assert_eq!(records.len(), 17);
    upsert_particles(&mut conn, &records).expect("insert");
    assert_eq!(count_particles(&conn).expect("count"), 17);

    let loaded = load_particles(&conn).expect("load");
    assert!(loaded.failures.is_empty());
    assert_eq!(loaded.records, records);
}

#[test]
fn reopening_store_keeps_schema() {
    let db = NamedTempFile::new().expect("db");
    {
        let conn = open_store(db.path()).expect("open");
        upsert_particle(&conn, &ParticleRecord::new("electron", 0.000_511, Category::Lepton))
            .expect("insert");
    }
    let conn = open_store(db.path()).expect("reopen");
    assert_eq!(count_particles(&conn).expect("count"), 1);
}

#[test]
fn upsert_replaces_by_name() {
    let db = NamedTempFile::new().expect("db");
    let conn = open_store(db.path()).expect("open");
    let first = ParticleRecord::new("top", 172.76, Category::Quark);
    let second = ParticleRecord::new("top", 173.0, Category::Quark).with_generation(3);
    upsert_particle(&conn, &first).expect("first");
    upsert_particle(&conn, &second).expect("second");
    let loaded = load_particles(&conn).expect("load");
    assert_eq!(loaded.records, vec![second]);
}

#[test]
fn legacy_rows_are_interpreted_or_reported() {
    let db = NamedTempFile::new().expect("db");
    let conn = open_store(db.path()).expect("open");
    conn.execute(
        "INSERT INTO particles(name, mass_gev, charge, spin, category, generation, quantum_numbers)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        params!["down_quark", 0.00467, -1.0 / 3.0, 0.5, "quark", 1, r#"{"color": 3, "note": "x"}"#],
    )
    .expect("insert down");
    conn.execute(
        "INSERT INTO particles(name, mass_gev, charge, spin, category, generation)
         VALUES (?, ?, ?, ?, ?, ?)",
        params!["higgs_boson", 125.25, 0.0, 0.0, "scalar", 0],
    )
    .expect("insert higgs");
    conn.execute(
        "INSERT INTO particles(name, mass_gev, charge, spin, category) VALUES (?, ?, ?, ?, ?)",
        params!["odd", 1.0, 0.123_456_7, 0.5, "other"],
    )
    .expect("insert odd");

    let loaded = load_particles(&conn).expect("load");
    assert_eq!(loaded.records.len(), 2);
    let down = &loaded.records[0];
    assert_eq!(down.charge, Rational::new(-1, 3).expect("fraction"));
    assert_eq!(down.extra.get("color"), Some(&3.0));
    assert!(!down.extra.contains_key("note"));
    let higgs = &loaded.records[1];
    assert_eq!(higgs.category, Category::Boson);
    assert!(higgs.generation.is_none());

    assert_eq!(loaded.failures.len(), 1);
    assert_eq!(loaded.failures[0].name, "odd");
    assert_eq!(loaded.failures[0].error.family(), "store");
}

#[test]
fn newer_schema_version_is_rejected() {
    let db = NamedTempFile::new().expect("db");
    {
        let conn = Connection::open(db.path()).expect("open");
        conn.execute_batch(
            "CREATE TABLE meta(version INTEGER NOT NULL, created_at TEXT NOT NULL);
             INSERT INTO meta VALUES (99, 'now');",
        )
        .expect("seed");
    }
    let err = open_store(db.path()).expect_err("version mismatch");
    assert_eq!(err.info().code, "gmq_store.schema_version");
}

#[test]
fn record_files_load_by_extension() {
    let dir = tempdir().expect("dir");
    let records = standard_model();

    let json = dir.path().join("particles.json");
    write_record_file(&json, &records).expect("write json");
    assert_eq!(load_records(&json).expect("load json").records, records);

    let yaml = dir.path().join("particles.yaml");
    write_record_file(&yaml, &records).expect("write yaml");
    assert_eq!(load_records(&yaml).expect("load yaml").records, records);

    let bare = dir.path().join("bare.yml");
    std::fs::write(
        &bare,
        "- name: electron\n  mass: 0.000511\n  category: lepton\n  charge: -1\n  spin: 1/2\n",
    )
    .expect("write bare");
    let loaded = load_records(&bare).expect("load bare");
    assert_eq!(loaded.records.len(), 1);
    assert_eq!(loaded.records[0].spin, Rational::new(1, 2).expect("fraction"));
}

#[test]
fn missing_record_file_is_a_store_error() {
    let dir = tempdir().expect("dir");
    let err = load_records(&dir.path().join("absent.json")).expect_err("absent");
    assert_eq!(err.family(), "store");
    assert!(err.info().context.contains_key("path"));
}

#[test]
fn unreadable_rows_are_reported_alongside_good_ones() {
    let dir = tempdir().expect("dir");
    let conn = open_store(&dir.path().join("store.db")).expect("open");
    conn.execute(
        "INSERT INTO particles(name, mass_gev, charge, spin, category) VALUES (?, ?, ?, ?, ?)",
        params!["electron", 0.000_511, -1.0, 0.5, "lepton"],
    )
    .expect("insert electron");
    conn.execute(
        "INSERT INTO particles(name, mass_gev, charge, spin, category) VALUES (?, ?, ?, ?, ?)",
        params!["mystery", "heavy", 0.0, 0.5, "other"],
    )
    .expect("insert text mass");
    conn.execute(
        "INSERT INTO particles(name, mass_gev, charge, spin, category) VALUES (?, ?, ?, ?, ?)",
        params!["muon", 0.105_66, -1.0, 0.5, "lepton"],
    )
    .expect("insert muon");

    let loaded = load_particles(&conn).expect("load");
    let names: Vec<_> = loaded.records.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, ["electron", "muon"]);
    assert_eq!(loaded.failures.len(), 1);
    assert_eq!(loaded.failures[0].name, "row 1");
    assert_eq!(loaded.failures[0].error.info().code, "gmq_store.row");
}

#[test]
fn record_files_reject_negative_spin_and_duplicate_names() {
    let dir = tempdir().expect("dir");
    let path = dir.path().join("particles.json");
    std::fs::write(
        &path,
        r#"{"particles": [
            {"name": "electron", "mass": 0.000511, "category": "lepton", "charge": -1, "spin": "-1/2"},
            {"name": "electron", "mass": 0.000511, "category": "lepton", "charge": -1, "spin": "1/2"},
            {"name": "muon", "mass": 0.10566, "category": "lepton", "charge": -1, "spin": "1/2"},
            {"name": "muon", "mass": 0.2, "category": "lepton", "charge": -1, "spin": "1/2"}
        ]}"#,
    )
    .expect("write");

    let loaded = load_records(&path).expect("load");
    assert_eq!(loaded.records.len(), 2);
    assert_eq!(loaded.records[0].name, "electron");
    assert_eq!(loaded.records[0].spin, Rational::new(1, 2).expect("fraction"));
    assert_eq!(loaded.records[1].mass, 0.10566);

    let codes: Vec<_> = loaded
        .failures
        .iter()
        .map(|failure| (failure.name.as_str(), failure.error.info().code.as_str()))
        .collect();
    assert_eq!(
        codes,
        [("electron", "gmq_store.spin"), ("muon", "gmq_store.duplicate_name")]
    );
}
