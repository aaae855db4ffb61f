//! Batch driver over column tables
//!
//! Run tests with: cargo test --test `batch_driver`

use aeroevap_core::batch::{INPUT_COLUMNS, OUTPUT_COLUMNS};
use aeroevap_core::{run, solve, BatchConfig, BatchError, MeteoTable};
use approx::assert_relative_eq;
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Four half-hourly records: neutral, unstable, missing humidity, calm
fn station_table(skin_column: &str) -> MeteoTable {
    MeteoTable::new(vec![1_700_000_000, 1_700_001_800, 1_700_003_600, 1_700_005_400])
        .with_column("WS", vec![0.597, 11.766, 4.0, 0.0])
        .unwrap()
        .with_column("P", vec![878.4, 920.06, 1000.0, 1000.0])
        .unwrap()
        .with_column("T_air", vec![5.72, 0.4288, 18.0, 20.0])
        .unwrap()
        .with_column(skin_column, vec![5.424, 6.3593, 16.0, 15.0])
        .unwrap()
        .with_column("RH", vec![91.1, 82.22, f64::NAN, 50.0])
        .unwrap()
}

#[test]
fn batch_matches_single_observation_solver() {
    let mut table = station_table("T_skin");
    let summary = run(&mut table, &BatchConfig::new(2.0, 1800.0)).unwrap();

    assert_eq!(summary.records, 4);
    assert_eq!(summary.converged, 2);
    assert_eq!(summary.missing_input, 1);
    assert_eq!(summary.all_regimes_failed, 1);
    assert!(summary.threads >= 1);

    let e = table.column("E").unwrap();
    let ce = table.column("Ce").unwrap();
    let vpd = table.column("VPD").unwrap();
    let stability = table.column("stability").unwrap();

    let expected = solve(11.766, 920.06, 0.4288, 6.3593, 82.22, 2.0, 1800.0);
    assert_eq!(e[1].to_bits(), expected.evaporation.to_bits());
    assert_eq!(ce[1].to_bits(), expected.transfer_coefficient.to_bits());
    assert_eq!(stability[1].to_bits(), expected.stability.to_bits());

    assert_relative_eq!(ce[0], 0.0017333926077895863, max_relative = 1e-6);
    assert_eq!(stability[0], 0.0);

    assert!(e[2].is_nan() && vpd[2].is_nan());
    assert!(e[3].is_nan() && ce[3].is_nan() && vpd[3].is_nan());
}

#[test]
fn outputs_follow_inputs_and_reruns_overwrite() {
    let mut table = station_table("T_skin");
    let config = BatchConfig::new(2.0, 1800.0).with_threads(1);
    run(&mut table, &config).unwrap();
    let first = table.column("E").unwrap().to_vec();
    run(&mut table, &config).unwrap();

    let names: Vec<&str> = table.column_names().collect();
    let expected: Vec<&str> = INPUT_COLUMNS.iter().chain(&OUTPUT_COLUMNS).copied().collect();
    assert_eq!(names, expected);

    for (a, b) in first.iter().zip(table.column("E").unwrap()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn variable_names_map_without_renaming_the_table() {
    let mut table = station_table("surface_temp");
    let config = BatchConfig::new(2.0, 1800.0).with_variable_name("surface_temp", "T_skin");

    let summary = run(&mut table, &config).unwrap();
    assert_eq!(summary.converged, 2);
    assert!(table.column("surface_temp").is_some());
    assert!(table.column("T_skin").is_none());
}

#[test]
fn missing_columns_fail_before_any_output() {
    let mut table = station_table("surface_temp");
    let err = run(&mut table, &BatchConfig::new(2.0, 1800.0)).unwrap_err();

    match &err {
        BatchError::MissingColumns { missing } => assert_eq!(missing, &["T_skin"]),
        other => panic!("expected MissingColumns, got {other}"),
    }
    assert!(err.to_string().contains("T_skin"));
    assert!(table.column("E").is_none());
}

#[test]
fn config_roundtrips_through_json() {
    let config = BatchConfig::new(2.0, 86400.0)
        .with_variable_name("surface_temp", "T_skin")
        .with_threads(4);
    let json = serde_json::to_string(&config).unwrap();
    let back: BatchConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn empty_table_runs() {
    let mut table = MeteoTable::new(Vec::new());
    for name in INPUT_COLUMNS {
        table.insert_column(name, Vec::new()).unwrap();
    }
    let summary = run(&mut table, &BatchConfig::new(2.0, 1800.0)).unwrap();
    assert_eq!(summary.records, 0);
    assert_eq!(table.column("E"), Some(&[][..]));
}
