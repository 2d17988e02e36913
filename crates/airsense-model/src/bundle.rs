//! The persisted model bundle and the assessments it produces.

use airsense_data::{QualityTier, Sensor, SensorFlags, SensorReading, StandardScaler};
use airsense_tree::{DecisionTree, MultiLabelModel, PersistentModel};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::debug;

use crate::ModelError;

/// Marker placed on sensors the diagnostics model flagged.
pub const DETECTION_MARKER: &str = "AI Detected";

/// How urgent a flagged sensor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The sensor is clearly outside its comfortable band.
    High,
}

/// A sensor the diagnostics model blames for poor air.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ProblematicSensor {
    /// Which sensor.
    pub sensor: Sensor,
    /// Display name, e.g. `"PM2.5"`.
    pub name: &'static str,
    /// Column key, e.g. `"pm25"`.
    pub key: &'static str,
    /// The measured value.
    pub value: f64,
    /// Measurement unit.
    pub unit: &'static str,
    /// Always [`DETECTION_MARKER`]: the model flags, it does not apply fixed limits.
    pub threshold: &'static str,
    /// Urgency.
    pub severity: Severity,
}

impl ProblematicSensor {
    fn new(sensor: Sensor, reading: &SensorReading) -> Self {
        Self {
            sensor,
            name: sensor.display_name(),
            key: sensor.key(),
            value: reading.value(sensor),
            unit: sensor.unit(),
            threshold: DETECTION_MARKER,
            severity: Severity::High,
        }
    }
}

/// The model's verdict on one reading.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Assessment {
    /// Predicted tier.
    pub quality: QualityTier,
    /// Tier label shown to end users.
    pub quality_label: &'static str,
    /// Tier indicator colour.
    pub color: &'static str,
    /// Probability of the predicted tier, rounded to two decimals.
    pub confidence: f64,
    /// Sensors the diagnostics model flagged, in feature order.
    pub problematic_sensors: Vec<ProblematicSensor>,
    /// The reading that was assessed.
    pub reading: SensorReading,
}

/// Scaler, quality tree and diagnostics model, trained, saved and swapped
/// together.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AirQualityModel {
    scaler: StandardScaler,
    quality: DecisionTree,
    diagnostics: MultiLabelModel,
}

impl AirQualityModel {
    /// Assemble a bundle from fitted parts.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ModelError::UnfittedComponent`] | either model is unfitted |
    /// | [`ModelError::ComponentWidthMismatch`] | a model was trained on a different width than the scaler produces |
    /// | [`ModelError::FlagColumnMismatch`] | diagnostics does not predict one flag per sensor |
    pub fn new(
        scaler: StandardScaler,
        quality: DecisionTree,
        diagnostics: MultiLabelModel,
    ) -> Result<Self, ModelError> {
        if !quality.is_fitted() {
            return Err(ModelError::UnfittedComponent {
                component: "quality tree",
            });
        }
        if !diagnostics.is_fitted() {
            return Err(ModelError::UnfittedComponent {
                component: "diagnostics model",
            });
        }

        let width = scaler.n_features();
        let widths = std::iter::once(("quality tree", quality.n_features())).chain(
            diagnostics
                .trees()
                .iter()
                .map(|t| ("diagnostics model", t.n_features())),
        );
        for (component, got) in widths {
            if got != width {
                return Err(ModelError::ComponentWidthMismatch {
                    component,
                    expected: width,
                    got,
                });
            }
        }
        if diagnostics.n_labels() != Sensor::COUNT {
            return Err(ModelError::FlagColumnMismatch {
                expected: Sensor::COUNT,
                got: diagnostics.n_labels(),
            });
        }

        Ok(Self {
            scaler,
            quality,
            diagnostics,
        })
    }

    /// Classify one reading and attribute the problem sensors.
    ///
    /// # Errors
    ///
    /// - [`ModelError::Data`] for a non-finite reading.
    /// - [`ModelError::Tree`] if a tree rejects the scaled features.
    pub fn assess(&self, reading: &SensorReading) -> Result<Assessment, ModelError> {
        reading.validate(0)?;
        let scaled = self.scaler.transform_one(&reading.to_features())?;

        let distribution = self.quality.predict_proba_sample(&scaled)?;
        let class = self.quality.predict_sample(&scaled)?;
        let quality = QualityTier::from_index(class)?;
        let confidence = (distribution.probability(class) * 100.0).round() / 100.0;

        let labels = self
            .diagnostics
            .predict(std::slice::from_ref(&scaled))?
            .pop()
            .unwrap_or_default();
        let flags = SensorFlags::from_labels(&labels)?;
        let problematic_sensors: Vec<ProblematicSensor> = flags
            .flagged()
            .map(|sensor| ProblematicSensor::new(sensor, reading))
            .collect();

        debug!(
            tier = %quality,
            confidence,
            n_flagged = problematic_sensors.len(),
            "reading assessed"
        );

        Ok(Assessment {
            quality,
            quality_label: quality.label(),
            color: quality.color(),
            confidence,
            problematic_sensors,
            reading: *reading,
        })
    }

    /// Assess many readings in parallel. Output order matches input order.
    ///
    /// # Errors
    ///
    /// Returns the first error any reading produces, see
    /// [`AirQualityModel::assess`].
    pub fn assess_batch(&self, readings: &[SensorReading]) -> Result<Vec<Assessment>, ModelError> {
        readings
            .par_iter()
            .map(|reading| self.assess(reading))
            .collect()
    }

    /// Return the fitted scaler.
    #[must_use]
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Return the quality tree.
    #[must_use]
    pub fn quality(&self) -> &DecisionTree {
        &self.quality
    }

    /// Return the diagnostics model.
    #[must_use]
    pub fn diagnostics(&self) -> &MultiLabelModel {
        &self.diagnostics
    }
}

impl PersistentModel for AirQualityModel {
    const KIND: &'static str = "air-quality";
}
