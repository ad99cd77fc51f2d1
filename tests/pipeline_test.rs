mod common;

use phc_insights::pipeline::processing::AlertLevel;
use phc_insights::pipeline::{Pipeline, PipelineConfig};
use phc_insights::types::Dataset;
use phc_insights::InsightError;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn read_json(path: &std::path::Path) -> Vec<Value> {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

fn find<'a>(records: &'a [Value], name: &str) -> &'a Value {
    records.iter().find(|r| r["name"] == name).unwrap()
}

#[test]
fn test_full_run_reconciles_and_scores_facilities() {
    let temp = tempdir().unwrap();
    let config = PipelineConfig {
        data_dir: temp.path().join("data"),
        output_dir: temp.path().join("outputs"),
    };
    common::write_all_sources(&config.data_dir);

    let result = Pipeline::run(&config).unwrap();

    // union of keys across the three surveys, duplicates collapsed
    assert_eq!(result.facilities, 4);
    let service = &result.datasets[0];
    assert_eq!(service.dataset, Dataset::ServiceDelivery);
    assert_eq!(service.records, 4);
    assert_eq!(service.skipped_rows, 1);
    assert_eq!(service.dropped, 1);
    assert_eq!(service.facilities, 2);
    assert!(result.diagnostics.iter().any(|d| d.starts_with("inclusivity:")));

    let alerts = read_json(&result.artifacts.outbreak_alerts);
    assert_eq!(alerts.len(), 4);
    let ikeja = find(&alerts, "ikeja phc");
    assert_eq!(ikeja["display_name"], "Ikeja Phc");
    assert_eq!(ikeja["lga"], "Ikeja");
    assert_eq!(ikeja["state"], "Lagos");
    // mean of 3 and 1 shortages
    assert_eq!(ikeja["shortage_score"], 2);
    assert_eq!(ikeja["alert_level"], "Medium");
    assert_eq!(find(&alerts, "badagry phc")["alert_level"], "Low");
    assert_eq!(find(&alerts, "ojo phc")["state"], "Ogun");

    let underserved = read_json(&result.artifacts.underserved_phcs);
    let index = |name: &str| find(&underserved, name)["underserved_index"].as_f64().unwrap();
    assert!((index("ikeja phc") - 0.8).abs() < 1e-9);
    assert!((index("epe phc") - 0.7).abs() < 1e-9);
    assert!((index("ojo phc") - 0.35).abs() < 1e-9);
    // the two 0.8 indices tie at rank 0.875, below the top-decile cut
    assert_eq!(result.underserved_flagged, 0);

    let warnings = read_json(&result.artifacts.resource_warnings);
    assert_eq!(find(&warnings, "ikeja phc")["resource_alert"], "High");
    assert_eq!(find(&warnings, "epe phc")["resource_alert"], "Low");
    assert_eq!(result.high_resource_alerts, 1);
    assert_eq!(result.high_shortage_alerts, 0);

    let mut summary = csv::Reader::from_path(&result.artifacts.metrics_summary).unwrap();
    assert_eq!(summary.records().count(), 4);
}

#[test]
fn test_missing_source_aborts_without_output() {
    let temp = tempdir().unwrap();
    let config = PipelineConfig {
        data_dir: temp.path().join("data"),
        output_dir: temp.path().join("outputs"),
    };
    fs::create_dir_all(&config.data_dir).unwrap();
    common::write_service_delivery(&config.data_dir);
    common::write_infrastructure(&config.data_dir);

    let err = Pipeline::run(&config).unwrap_err();
    assert!(matches!(err, InsightError::MissingSource { dataset: Dataset::Inclusivity, .. }));
    assert!(!config.output_dir.join("outbreak_alerts.json").exists());
}

#[test]
fn test_rerun_is_idempotent() {
    let temp = tempdir().unwrap();
    let config = PipelineConfig {
        data_dir: temp.path().join("data"),
        output_dir: temp.path().join("outputs"),
    };
    common::write_all_sources(&config.data_dir);

    let first = Pipeline::run(&config).unwrap();
    let first_bytes = fs::read(&first.artifacts.underserved_phcs).unwrap();
    let second = Pipeline::run(&config).unwrap();
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(fs::read(&second.artifacts.underserved_phcs).unwrap(), first_bytes);
}

#[test]
fn test_build_table_keeps_merge_order() {
    let temp = tempdir().unwrap();
    let config = PipelineConfig {
        data_dir: temp.path().to_path_buf(),
        output_dir: temp.path().join("unused"),
    };
    common::write_all_sources(&config.data_dir);

    let table = Pipeline::build_table(&config).unwrap();
    let keys: Vec<_> = table.facilities.iter().map(|f| f.row.facility_key.as_str()).collect();
    assert_eq!(keys, vec!["ikeja phc", "epe phc", "ojo phc", "badagry phc"]);
    assert_eq!(table.facilities[0].indices.alert_level, AlertLevel::Medium);
    assert!(!config.output_dir.exists());
}
