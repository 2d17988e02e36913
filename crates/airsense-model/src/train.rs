//! End-to-end training: synthetic data, split, scaling, both models, evaluation.

use airsense_data::{StandardScaler, TrainingData, generate_training_data, train_test_split};
use airsense_tree::{DecisionTreeConfig, MultiLabelModel};
use tracing::{info, instrument};

use crate::{AirQualityModel, ModelError, TierEvaluation};

/// Settings for [`train`].
///
/// Construct via [`TrainingConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter                   | Default |
/// |-----------------------------|---------|
/// | `seed`                      | 42      |
/// | `test_fraction`             | 0.2     |
/// | `quality_max_depth`         | 15      |
/// | `quality_min_samples_split` | 5       |
/// | `diagnostics_max_depth`     | 15      |
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    seed: u64,
    test_fraction: f64,
    quality_max_depth: usize,
    quality_min_samples_split: usize,
    diagnostics_max_depth: usize,
}

impl TrainingConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            quality_max_depth: 15,
            quality_min_samples_split: 5,
            diagnostics_max_depth: 15,
        }
    }

    /// Set the seed used for data generation, splitting and tree growth.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the held-out fraction.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Set the quality tree's maximum depth.
    #[must_use]
    pub fn with_quality_max_depth(mut self, max_depth: usize) -> Self {
        self.quality_max_depth = max_depth;
        self
    }

    /// Set the quality tree's minimum samples to split.
    #[must_use]
    pub fn with_quality_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.quality_min_samples_split = min_samples_split;
        self
    }

    /// Set the maximum depth of each diagnostics tree.
    #[must_use]
    pub fn with_diagnostics_max_depth(mut self, max_depth: usize) -> Self {
        self.diagnostics_max_depth = max_depth;
        self
    }

    /// Return the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the held-out fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Return the quality tree's maximum depth.
    #[must_use]
    pub fn quality_max_depth(&self) -> usize {
        self.quality_max_depth
    }

    /// Return the quality tree's minimum samples to split.
    #[must_use]
    pub fn quality_min_samples_split(&self) -> usize {
        self.quality_min_samples_split
    }

    /// Return the diagnostics trees' maximum depth.
    #[must_use]
    pub fn diagnostics_max_depth(&self) -> usize {
        self.diagnostics_max_depth
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// The trained bundle.
    pub model: AirQualityModel,
    /// Quality-tier accuracy on the held-out split.
    pub quality_accuracy: f64,
    /// Exact-match accuracy of the sensor flags on the held-out split.
    pub diagnostics_accuracy: f64,
    /// Per-tier breakdown of the held-out quality predictions.
    pub evaluation: TierEvaluation,
    /// Number of training samples.
    pub n_train: usize,
    /// Number of held-out samples.
    pub n_test: usize,
}

/// Train a bundle on freshly generated synthetic data.
///
/// # Errors
///
/// See [`train_on`].
pub fn train(config: &TrainingConfig) -> Result<TrainingReport, ModelError> {
    let data = generate_training_data(config.seed);
    train_on(&data, config)
}

/// Train a bundle on the given labelled data.
///
/// The scaler is fitted on the training split only; both models see scaled
/// features.
///
/// # Errors
///
/// - [`ModelError::Data`] when the split or scaler rejects the data.
/// - [`ModelError::Tree`] when a model fails to fit or predict.
#[instrument(skip(data, config), fields(n_samples = data.len(), seed = config.seed))]
pub fn train_on(data: &TrainingData, config: &TrainingConfig) -> Result<TrainingReport, ModelError> {
    let split = train_test_split(data.len(), config.test_fraction, config.seed)?;
    let train = data.subset(&split.train);
    let test = data.subset(&split.test);

    let scaler = StandardScaler::fit(&train.features())?;
    let train_x = scaler.transform(&train.features())?;
    let test_x = scaler.transform(&test.features())?;

    let quality = DecisionTreeConfig::new()
        .with_max_depth(config.quality_max_depth)
        .with_min_samples_split(config.quality_min_samples_split)
        .with_seed(config.seed)
        .fit(&train_x, &train.tier_labels())?;

    let mut diagnostics = MultiLabelModel::new()
        .with_max_depth(config.diagnostics_max_depth)
        .with_seed(config.seed);
    diagnostics.fit(&train_x, &train.flag_matrix())?;

    let predicted = quality.predict(&test_x)?;
    let evaluation = TierEvaluation::from_predictions(test.tiers(), &predicted)?;
    let quality_accuracy = evaluation.accuracy;
    let diagnostics_accuracy = diagnostics.score(&test_x, &test.flag_matrix())?;

    info!(
        quality_accuracy,
        diagnostics_accuracy,
        n_train = train.len(),
        n_test = test.len(),
        quality_nodes = quality.n_nodes(),
        "models trained"
    );

    Ok(TrainingReport {
        model: AirQualityModel::new(scaler, quality, diagnostics)?,
        quality_accuracy,
        diagnostics_accuracy,
        evaluation,
        n_train: train.len(),
        n_test: test.len(),
    })
}

#[cfg(test)]
mod tests {
    use airsense_data::{QualityTier, SensorFlags, SensorReading, TrainingData};

    use super::{TrainingConfig, train_on};

    /// 40 readings: CO2 alone decides the tier and the CO2 flag.
    fn co2_ladder() -> TrainingData {
        let mut data = TrainingData::new();
        for i in 0..40 {
            let co2 = 400.0 + f64::from(i) * 50.0;
            let (tier, flagged) = match co2 {
                c if c < 800.0 => (QualityTier::Good, false),
                c if c < 1000.0 => (QualityTier::Moderate, false),
                _ => (QualityTier::Poor, true),
            };
            data.push(
                SensorReading::new(co2, 1.0, 10.0, 27.0, 75.0),
                tier,
                SensorFlags::from_mask([flagged, false, false, false, false]),
            );
        }
        data
    }

    #[test]
    fn defaults_follow_documented_table() {
        let config = TrainingConfig::new();
        assert_eq!(config.seed(), 42);
        assert_eq!(config.test_fraction(), 0.2);
        assert_eq!(config.quality_max_depth(), 15);
        assert_eq!(config.quality_min_samples_split(), 5);
        assert_eq!(config.diagnostics_max_depth(), 15);
    }

    #[test]
    fn report_sizes_and_bounds() {
        let report = train_on(&co2_ladder(), &TrainingConfig::new()).unwrap();
        assert_eq!(report.n_train, 32);
        assert_eq!(report.n_test, 8);
        assert!((0.0..=1.0).contains(&report.quality_accuracy));
        assert!((0.0..=1.0).contains(&report.diagnostics_accuracy));
        let total: usize = report.evaluation.tiers.iter().map(|row| row.support).sum();
        assert_eq!(total, 8);
        assert_eq!(report.evaluation.accuracy, report.quality_accuracy);
    }

    #[test]
    fn bad_fraction_surfaces_as_data_error() {
        let config = TrainingConfig::new().with_test_fraction(1.5);
        let err = train_on(&co2_ladder(), &config).unwrap_err();
        assert!(matches!(err, crate::ModelError::Data(_)));
    }
}
