//! Integration tests for the parallel batch executor and aggregator

mod common;

use common::SyntheticBackend;
use pamflow_core::error::PamError;
use pamflow_core::metrics::{MetricParams, MetricSelection, ParamValue};
use pamflow_core::pipeline::{aggregate_results, run_batch, work_items, BatchConfig, WorkerCount};
use pamflow_core::table::{CsvBackend, SchemaContract, ValidatedTableStore};
use pamflow_core::types::{ColumnType, Value, WorkItem};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn selection(names: &[&str]) -> MetricSelection {
    names
        .iter()
        .map(|n| (n.to_string(), MetricParams::new()))
        .collect()
}

fn batch_config(names: &[&str], workers: WorkerCount) -> BatchConfig {
    BatchConfig {
        selection: selection(names),
        workers,
        ..BatchConfig::default()
    }
}

/// Write a fake audio file the synthetic backend can "decode"
fn write_audio(dir: &Path, name: &str) -> WorkItem {
    let path = dir.join(name);
    fs::write(&path, name.as_bytes().repeat(64)).expect("write audio fixture");
    let id = name.trim_end_matches(".wav").to_string();
    WorkItem::new(path, id)
}

#[test]
fn test_batch_isolates_single_failure() {
    let dir = TempDir::new().expect("temp dir");
    let items = vec![
        write_audio(dir.path(), "site01_a.wav"),
        WorkItem::new(dir.path().join("missing.wav"), "site01_b"),
        write_audio(dir.path(), "site01_c.wav"),
    ];

    let config = batch_config(&["RMS"], WorkerCount::Fixed(2));
    let (results, stats) =
        run_batch(&SyntheticBackend, &items, &config).expect("batch call must not raise");

    assert_eq!(stats.total, 3);
    assert_eq!(stats.successful, 2);
    assert_eq!(stats.failed, 1);

    let mut ids: Vec<&str> = results.iter().map(|r| r.media_id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["site01_a", "site01_c"], "only the failing item is absent");
}

#[test]
fn test_all_items_failing_yields_empty_results_without_error() {
    let dir = TempDir::new().expect("temp dir");
    let items = vec![
        WorkItem::new(dir.path().join("gone1.wav"), "g1"),
        WorkItem::new(dir.path().join("gone2.wav"), "g2"),
    ];

    let config = batch_config(&["RMS"], WorkerCount::Fixed(2));
    let (results, stats) = run_batch(&SyntheticBackend, &items, &config).expect("no raise");

    assert!(results.is_empty());
    assert_eq!(stats.failed, 2);
}

#[test]
fn test_invalid_worker_count_aborts_before_any_work() {
    let dir = TempDir::new().expect("temp dir");
    let items = vec![write_audio(dir.path(), "site01_a.wav")];

    let config = batch_config(&["RMS"], WorkerCount::Fixed(0));
    let err = run_batch(&SyntheticBackend, &items, &config).expect_err("zero workers");
    assert!(matches!(err, PamError::Config(_)));
}

#[test]
fn test_requested_metrics_are_exactly_the_computed_keys() {
    let dir = TempDir::new().expect("temp dir");
    let items = vec![write_audio(dir.path(), "fixed.wav")];

    let config = batch_config(&["RMS", "ACI"], WorkerCount::Fixed(1));
    let (results, _) = run_batch(&SyntheticBackend, &items, &config).expect("batch");

    assert_eq!(results.len(), 1);
    let keys: Vec<&str> = results[0].values.keys().map(String::as_str).collect();
    assert_eq!(keys, ["ACI", "RMS"]);
}

#[test]
fn test_unknown_metric_is_skipped_not_fatal() {
    let dir = TempDir::new().expect("temp dir");
    let items = vec![write_audio(dir.path(), "fixed.wav")];

    let config = batch_config(&["RMS", "XYZ"], WorkerCount::Fixed(1));
    let (results, stats) = run_batch(&SyntheticBackend, &items, &config).expect("batch");

    assert_eq!(stats.successful, 1);
    let keys: Vec<&str> = results[0].values.keys().map(String::as_str).collect();
    assert_eq!(keys, ["RMS"], "unknown name skipped, known one computed");
}

#[test]
fn test_full_catalog_computes_on_synthetic_signal() {
    let dir = TempDir::new().expect("temp dir");
    let items = vec![write_audio(dir.path(), "fixed.wav")];

    let mut sel = selection(&["ACI", "ADI", "BI", "H", "Hf", "Ht", "NDSI", "NP", "RMS"]);
    sel.insert(
        "SC".into(),
        MetricParams::new().with("db_threshold", ParamValue::Number(-40.0)),
    );
    let config = BatchConfig {
        selection: sel,
        workers: WorkerCount::Fixed(1),
        ..BatchConfig::default()
    };

    let (results, _) = run_batch(&SyntheticBackend, &items, &config).expect("batch");
    assert_eq!(results[0].values.len(), 10);

    // H is defined as the product of the independently computed entropies
    let h = results[0].values["H"].as_scalar().expect("scalar");
    let hf = results[0].values["Hf"].as_scalar().expect("scalar");
    let ht = results[0].values["Ht"].as_scalar().expect("scalar");
    assert!((h - hf * ht).abs() < 1e-12);
}

#[test]
fn test_end_to_end_store_to_result_table() {
    let dir = TempDir::new().expect("temp dir");

    // Two readable fixtures plus one locator pointing at nothing
    let a = write_audio(dir.path(), "m1.wav");
    let b = write_audio(dir.path(), "m2.wav");
    let missing = dir.path().join("m3.wav");

    let csv_path = dir.path().join("media.csv");
    fs::write(
        &csv_path,
        format!(
            "mediaID,filePath,timestamp\n\
             m1,{},2024-01-05\n\
             m2,{},2024-01-05\n\
             m3,{},2024-01-05\n",
            a.path.display(),
            b.path.display(),
            missing.display()
        ),
    )
    .expect("write media csv");

    let contract = SchemaContract::builder(["mediaID", "filePath", "timestamp"])
        .column_type("mediaID", ColumnType::Str)
        .required("mediaID")
        .required("filePath")
        .unique("mediaID")
        .date_column("timestamp")
        .build()
        .expect("contract");
    let store = ValidatedTableStore::new(contract, CsvBackend::new(&csv_path));

    let media = store.load().expect("media table loads");
    let items = work_items(&media, "filePath", "mediaID").expect("projection");
    assert_eq!(items.len(), 3);

    let config = batch_config(&["ACI", "RMS"], WorkerCount::Fixed(2));
    let (results, stats) = run_batch(&SyntheticBackend, &items, &config).expect("batch");
    assert_eq!(stats.failed, 1);

    let table = aggregate_results(&results, "mediaID");
    assert_eq!(table.columns(), ["mediaID", "ACI", "RMS"]);
    assert_eq!(table.len(), 2, "failed item contributes no row");

    let mut ids: Vec<String> = (0..table.len())
        .map(|row| match table.cell(row, "mediaID") {
            Some(Value::Str(s)) => s.clone(),
            other => panic!("unexpected identifier cell {other:?}"),
        })
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, ["m1", "m2"]);

    for row in 0..table.len() {
        assert!(
            matches!(table.cell(row, "RMS"), Some(Value::Float(v)) if *v > 0.0),
            "surviving rows carry computed metrics"
        );
    }
}

#[test]
fn test_results_correlate_by_identifier_not_position() {
    let dir = TempDir::new().expect("temp dir");
    let items: Vec<WorkItem> = (0..8)
        .map(|i| write_audio(dir.path(), &format!("m{i}.wav")))
        .collect();

    let config = batch_config(&["RMS"], WorkerCount::Fixed(4));
    let (results, stats) = run_batch(&SyntheticBackend, &items, &config).expect("batch");

    assert_eq!(stats.successful, 8);
    // Completion order is unspecified; every identifier appears exactly once
    let mut ids: Vec<&str> = results.iter().map(|r| r.media_id.as_str()).collect();
    ids.sort_unstable();
    let expected: Vec<String> = (0..8).map(|i| format!("m{i}")).collect();
    assert_eq!(ids, expected);
}
