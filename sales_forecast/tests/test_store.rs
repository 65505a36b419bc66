mod common;

use common::week_table;
use sales_forecast::config::ColumnNames;
use sales_forecast::data::{Dataset, FrameSource};
use sales_forecast::encoder::encode_dataset;
use sales_forecast::store::FileModelStore;
use sales_forecast::{ForecastError, ModelStore, ModelTrainer, SalesModel, SalesRecord};
use std::fs;
use tempfile::tempdir;

fn trained_model() -> SalesModel {
    let dataset = Dataset::load(&FrameSource::new(week_table()), &ColumnNames::default()).unwrap();
    ModelTrainer::default().train(dataset.records()).unwrap()
}

#[test]
fn test_saved_model_predicts_identically() {
    let dir = tempdir().unwrap();
    let store = FileModelStore::new(dir.path().join("model.json"));

    let model = trained_model();
    store.save(&model).unwrap();
    let loaded = store.load().unwrap();

    let dataset = Dataset::load(&FrameSource::new(week_table()), &ColumnNames::default()).unwrap();
    let encoded = encode_dataset(dataset.records());

    let before = model.predict(&encoded.features).unwrap();
    let after = loaded.predict(&encoded.features).unwrap();
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(loaded.summary(), model.summary());
}

#[test]
fn test_missing_slot_reports_model_not_found() {
    let dir = tempdir().unwrap();
    let store = FileModelStore::new(dir.path().join("absent.json"));

    let err = store.load().unwrap_err();
    assert!(matches!(err, ForecastError::ModelNotFound(_)));
}

#[test]
fn test_save_replaces_previous_model() {
    let dir = tempdir().unwrap();
    let store = FileModelStore::new(dir.path().join("model.json"));

    let first = ModelTrainer::default()
        .train(&[SalesRecord::new([1.0; 5], "월", 10.0)])
        .unwrap();
    let second = trained_model();

    store.save(&first).unwrap();
    store.save(&second).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, second);
    assert_eq!(loaded.summary().samples, 7);
}

#[test]
fn test_save_leaves_no_temporary_files() {
    let dir = tempdir().unwrap();
    let store = FileModelStore::new(dir.path().join("model.json"));

    store.save(&trained_model()).unwrap();
    store.save(&trained_model()).unwrap();

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec!["model.json"]);
}

#[test]
fn test_save_creates_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("models").join("model.json");
    let store = FileModelStore::new(&path);

    store.save(&trained_model()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_corrupted_slot_is_a_serialization_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    fs::write(&path, "{\"forest\": ").unwrap();

    let err = FileModelStore::new(&path).load().unwrap_err();
    assert!(matches!(err, ForecastError::Serialization(_)));
}
