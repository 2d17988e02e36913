//! Full pipeline on the synthetic training set: train, assess, persist, swap.

use airsense_data::{QualityTier, Sensor, SensorReading};
use airsense_model::{ModelRegistry, TrainingConfig, train};
use airsense_tree::PersistentModel;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Training quality
// ---------------------------------------------------------------------------

#[test]
fn default_training_is_accurate() {
    let report = train(&TrainingConfig::new()).unwrap();
    assert_eq!(report.n_train, 2680);
    assert_eq!(report.n_test, 670);
    assert!(
        report.quality_accuracy > 0.8,
        "quality accuracy {:.3}",
        report.quality_accuracy
    );
    assert!(
        report.diagnostics_accuracy > 0.75,
        "diagnostics accuracy {:.3}",
        report.diagnostics_accuracy
    );
}

#[test]
fn training_is_deterministic() {
    let config = TrainingConfig::new().with_seed(9);
    let a = train(&config).unwrap();
    let b = train(&config).unwrap();
    assert_eq!(a.model, b.model);
    assert_eq!(a.quality_accuracy, b.quality_accuracy);
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

#[test]
fn clean_and_polluted_readings() {
    let model = train(&TrainingConfig::new()).unwrap().model;

    let clean = model
        .assess(&SensorReading::new(420.0, 0.5, 8.0, 27.0, 75.0))
        .unwrap();
    assert_eq!(clean.quality, QualityTier::Good);
    assert!(clean.problematic_sensors.is_empty());
    assert!((0.0..=1.0).contains(&clean.confidence));

    let smoky = model
        .assess(&SensorReading::new(2400.0, 40.0, 180.0, 38.0, 50.0))
        .unwrap();
    assert_eq!(smoky.quality, QualityTier::Poor);
    assert!(
        smoky
            .problematic_sensors
            .iter()
            .any(|p| p.sensor == Sensor::Pm25 || p.sensor == Sensor::Co2)
    );
}

// ---------------------------------------------------------------------------
// Persistence and registry
// ---------------------------------------------------------------------------

#[test]
fn saved_bundle_assesses_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("air.bin");
    let model = train(&TrainingConfig::new()).unwrap().model;
    model.save(&path).unwrap();

    let loaded = airsense_model::AirQualityModel::load(&path).unwrap();
    let readings = [
        SensorReading::new(650.0, 2.0, 20.0, 27.0, 65.0),
        SensorReading::new(1300.0, 12.0, 60.0, 31.0, 85.0),
        SensorReading::new(3000.0, 60.0, 250.0, 40.0, 95.0),
    ];
    assert_eq!(
        model.assess_batch(&readings).unwrap(),
        loaded.assess_batch(&readings).unwrap()
    );
}

#[test]
fn registry_trains_once_then_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("air.bin");
    let config = TrainingConfig::new();

    let first = ModelRegistry::load_or_train(&path, &config).unwrap();
    assert!(path.exists());
    let second = ModelRegistry::load_or_train(&path, &config).unwrap();
    assert_eq!(*first.get_current(), *second.get_current());
}

#[test]
fn retrain_publishes_new_model() {
    let registry = ModelRegistry::new(train(&TrainingConfig::new()).unwrap().model);
    let before = registry.get_current();

    let report = registry.retrain(&TrainingConfig::new().with_seed(7)).unwrap();
    let after = registry.get_current();

    assert_eq!(*after, report.model);
    assert_ne!(*before, *after);
}
