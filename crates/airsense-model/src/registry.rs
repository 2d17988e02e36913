//! Holder of the model currently serving assessments.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use airsense_tree::PersistentModel;
use tracing::{info, instrument};

use crate::{AirQualityModel, ModelError, TrainingConfig, TrainingReport, train};

/// Owns the current [`AirQualityModel`] and swaps it atomically.
///
/// Readers get an `Arc` snapshot and keep using it even if a new model is
/// published meanwhile; they never observe a half-replaced bundle.
#[derive(Debug)]
pub struct ModelRegistry {
    current: RwLock<Arc<AirQualityModel>>,
}

impl ModelRegistry {
    /// Create a registry serving `model`.
    #[must_use]
    pub fn new(model: AirQualityModel) -> Self {
        Self {
            current: RwLock::new(Arc::new(model)),
        }
    }

    /// Load the bundle at `path`, or train one and save it there when the
    /// file does not exist yet.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Tree`] when an existing file cannot be loaded or the
    ///   new bundle cannot be saved.
    /// - Any error from [`train`].
    #[instrument(skip(path, config), fields(path = %path.as_ref().display()))]
    pub fn load_or_train(
        path: impl AsRef<Path>,
        config: &TrainingConfig,
    ) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if path.exists() {
            let model = AirQualityModel::load(path)?;
            info!("serving saved model");
            return Ok(Self::new(model));
        }

        info!("no saved model, training a new one");
        let report = train(config)?;
        report.model.save(path)?;
        Ok(Self::new(report.model))
    }

    /// Return a snapshot of the current model.
    #[must_use]
    pub fn get_current(&self) -> Arc<AirQualityModel> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish `model` and return the one it replaced.
    pub fn replace(&self, model: AirQualityModel) -> Arc<AirQualityModel> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(model))
    }

    /// Train a new bundle and publish it once training has fully succeeded.
    ///
    /// On error the current model keeps serving.
    ///
    /// # Errors
    ///
    /// Any error from [`train`].
    pub fn retrain(&self, config: &TrainingConfig) -> Result<TrainingReport, ModelError> {
        let report = train(config)?;
        self.replace(report.model.clone());
        info!(
            quality_accuracy = report.quality_accuracy,
            diagnostics_accuracy = report.diagnostics_accuracy,
            "retrained model published"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use airsense_data::{QualityTier, SensorFlags, SensorReading, TrainingData};
    use airsense_tree::PersistentModel;

    use super::ModelRegistry;
    use crate::{AirQualityModel, TrainingConfig, train_on};

    fn ladder_model(seed: u64) -> AirQualityModel {
        let mut data = TrainingData::new();
        for i in 0..30 {
            let pm25 = 5.0 + f64::from(i) * 4.0;
            let (tier, flagged) = match pm25 {
                p if p < 35.0 => (QualityTier::Good, false),
                p if p < 75.0 => (QualityTier::Moderate, false),
                _ => (QualityTier::Poor, true),
            };
            data.push(
                SensorReading::new(500.0, 1.0, pm25, 26.0, 70.0),
                tier,
                SensorFlags::from_mask([false, false, flagged, false, false]),
            );
        }
        train_on(&data, &TrainingConfig::new().with_seed(seed))
            .unwrap()
            .model
    }

    #[test]
    fn replace_returns_previous_and_publishes_new() {
        let first = ladder_model(1);
        let second = ladder_model(2);
        let registry = ModelRegistry::new(first.clone());

        let snapshot = registry.get_current();
        let old = registry.replace(second.clone());

        assert_eq!(*old, first);
        assert_eq!(*registry.get_current(), second);
        // Snapshots taken before the swap keep the old bundle alive.
        assert!(Arc::ptr_eq(&snapshot, &old));
    }

    #[test]
    fn concurrent_readers_see_whole_models() {
        let first = ladder_model(1);
        let second = ladder_model(2);
        assert_ne!(first, second);
        let registry = &ModelRegistry::new(first.clone());
        let (a, b) = (&first, &second);

        let snapshots: Vec<Arc<AirQualityModel>> = std::thread::scope(|scope| {
            let readers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(move || {
                        (0..200)
                            .map(|_| registry.get_current())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            scope.spawn(move || {
                for i in 0..50 {
                    let next = if i % 2 == 0 { b } else { a };
                    registry.replace(next.clone());
                }
            });
            readers
                .into_iter()
                .flat_map(|reader| reader.join().unwrap())
                .collect()
        });

        assert_eq!(snapshots.len(), 800);
        for snapshot in &snapshots {
            assert!(**snapshot == first || **snapshot == second);
        }
        // 50 replacements alternate and end on `first`.
        assert_eq!(*registry.get_current(), first);
    }

    #[test]
    fn load_or_train_prefers_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let saved = ladder_model(7);
        saved.save(&path).unwrap();

        let registry = ModelRegistry::load_or_train(&path, &TrainingConfig::new()).unwrap();
        assert_eq!(*registry.get_current(), saved);
    }

    #[test]
    fn load_or_train_propagates_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"not a model").unwrap();

        let result = ModelRegistry::load_or_train(&path, &TrainingConfig::new());
        assert!(matches!(result, Err(crate::ModelError::Tree(_))));
    }
}
