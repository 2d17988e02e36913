//! Domain types for airsense-data.

use std::fmt;

use crate::DataError;

/// One of the five sensors, in model feature order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Sensor {
    /// Carbon dioxide, ppm.
    Co2,
    /// Carbon monoxide, ppm.
    Co,
    /// Fine particulate matter, μg/m³.
    Pm25,
    /// Air temperature, °C.
    Temperature,
    /// Relative humidity, %.
    Humidity,
}

impl Sensor {
    /// All sensors in feature order.
    pub const ALL: [Sensor; 5] = [
        Sensor::Co2,
        Sensor::Co,
        Sensor::Pm25,
        Sensor::Temperature,
        Sensor::Humidity,
    ];

    /// Number of sensors, and therefore model features.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this sensor in a feature row.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column key used in CSV headers and JSON output.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Sensor::Co2 => "co2",
            Sensor::Co => "co",
            Sensor::Pm25 => "pm25",
            Sensor::Temperature => "temperature",
            Sensor::Humidity => "humidity",
        }
    }

    /// Human-readable sensor name shown to end users.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Sensor::Co2 => "CO2",
            Sensor::Co => "CO",
            Sensor::Pm25 => "PM2.5",
            Sensor::Temperature => "Nhiệt độ",
            Sensor::Humidity => "Độ ẩm",
        }
    }

    /// Measurement unit.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Sensor::Co2 | Sensor::Co => "ppm",
            Sensor::Pm25 => "μg/m³",
            Sensor::Temperature => "°C",
            Sensor::Humidity => "%",
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single air-quality measurement from the five sensors.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SensorReading {
    /// CO2 concentration, ppm.
    pub co2: f64,
    /// CO concentration, ppm.
    pub co: f64,
    /// PM2.5 concentration, μg/m³.
    pub pm25: f64,
    /// Temperature, °C.
    pub temperature: f64,
    /// Relative humidity, %.
    pub humidity: f64,
}

impl SensorReading {
    /// Create a reading from the five sensor values.
    #[must_use]
    pub fn new(co2: f64, co: f64, pm25: f64, temperature: f64, humidity: f64) -> Self {
        Self {
            co2,
            co,
            pm25,
            temperature,
            humidity,
        }
    }

    /// Build a reading from a feature row in [`Sensor::ALL`] order.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::ReadingWidth`] unless `values` has exactly five entries.
    pub fn from_features(values: &[f64]) -> Result<Self, DataError> {
        match values {
            &[co2, co, pm25, temperature, humidity] => {
                Ok(Self::new(co2, co, pm25, temperature, humidity))
            }
            _ => Err(DataError::ReadingWidth {
                expected: Sensor::COUNT,
                got: values.len(),
            }),
        }
    }

    /// Return the value of one sensor.
    #[must_use]
    pub fn value(&self, sensor: Sensor) -> f64 {
        match sensor {
            Sensor::Co2 => self.co2,
            Sensor::Co => self.co,
            Sensor::Pm25 => self.pm25,
            Sensor::Temperature => self.temperature,
            Sensor::Humidity => self.humidity,
        }
    }

    /// Return the feature row in [`Sensor::ALL`] order.
    #[must_use]
    pub fn to_features(&self) -> Vec<f64> {
        Sensor::ALL.iter().map(|&s| self.value(s)).collect()
    }

    /// Check that every value is finite.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NonFiniteReading`] naming the first bad sensor.
    pub fn validate(&self, sample_index: usize) -> Result<(), DataError> {
        for sensor in Sensor::ALL {
            let value = self.value(sensor);
            if !value.is_finite() {
                return Err(DataError::NonFiniteReading {
                    sample_index,
                    sensor: sensor.key(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Overall air-quality tier, the quality tree's target.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    /// Every sensor inside its comfortable band.
    Good,
    /// One or two sensors slightly out of band.
    Moderate,
    /// At least one sensor clearly out of band.
    Poor,
}

impl QualityTier {
    /// All tiers in class-index order.
    pub const ALL: [QualityTier; 3] = [QualityTier::Good, QualityTier::Moderate, QualityTier::Poor];

    /// Class index used as the tree label.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a class index back to a tier.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidLabel`] for indices above 2.
    pub fn from_index(index: usize) -> Result<Self, DataError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(DataError::InvalidLabel {
                target: "quality tier",
                label: index,
            })
    }

    /// Label shown to end users.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QualityTier::Good => "Tốt",
            QualityTier::Moderate => "Trung bình",
            QualityTier::Poor => "Kém",
        }
    }

    /// Indicator colour for dashboards.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            QualityTier::Good => "green",
            QualityTier::Moderate => "yellow",
            QualityTier::Poor => "red",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-sensor problem flags, the diagnostics model's targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct SensorFlags([bool; Sensor::COUNT]);

impl SensorFlags {
    /// No sensor flagged.
    pub const NONE: SensorFlags = SensorFlags([false; Sensor::COUNT]);

    /// Build flags from a mask in [`Sensor::ALL`] order.
    #[must_use]
    pub fn from_mask(mask: [bool; Sensor::COUNT]) -> Self {
        Self(mask)
    }

    /// Build flags from 0/1 labels in [`Sensor::ALL`] order.
    ///
    /// # Errors
    ///
    /// - [`DataError::ReadingWidth`] unless there are five labels.
    /// - [`DataError::InvalidLabel`] for a label other than 0 or 1.
    pub fn from_labels(labels: &[usize]) -> Result<Self, DataError> {
        if labels.len() != Sensor::COUNT {
            return Err(DataError::ReadingWidth {
                expected: Sensor::COUNT,
                got: labels.len(),
            });
        }
        let mut mask = [false; Sensor::COUNT];
        for (slot, &label) in mask.iter_mut().zip(labels) {
            *slot = match label {
                0 => false,
                1 => true,
                _ => {
                    return Err(DataError::InvalidLabel {
                        target: "sensor flag",
                        label,
                    });
                }
            };
        }
        Ok(Self(mask))
    }

    /// Return the flags as 0/1 labels in [`Sensor::ALL`] order.
    #[must_use]
    pub fn to_labels(&self) -> Vec<usize> {
        self.0.iter().map(|&f| usize::from(f)).collect()
    }

    /// Return `true` if `sensor` is flagged.
    #[must_use]
    pub fn is_set(&self, sensor: Sensor) -> bool {
        self.0[sensor.index()]
    }

    /// Iterate over the flagged sensors in feature order.
    pub fn flagged(&self) -> impl Iterator<Item = Sensor> + '_ {
        Sensor::ALL.into_iter().filter(|&s| self.is_set(s))
    }

    /// Return `true` if no sensor is flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&f| f)
    }
}

/// A labelled training set: readings with their tier and sensor flags.
///
/// The three vectors are parallel: `readings[i]` is labelled by `tiers[i]`
/// and `flags[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingData {
    readings: Vec<SensorReading>,
    tiers: Vec<QualityTier>,
    flags: Vec<SensorFlags>,
}

impl TrainingData {
    /// Create an empty training set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one labelled reading.
    pub fn push(&mut self, reading: SensorReading, tier: QualityTier, flags: SensorFlags) {
        self.readings.push(reading);
        self.tiers.push(tier);
        self.flags.push(flags);
    }

    /// Return the readings.
    #[must_use]
    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    /// Return the tier labels.
    #[must_use]
    pub fn tiers(&self) -> &[QualityTier] {
        &self.tiers
    }

    /// Return the sensor flags.
    #[must_use]
    pub fn flags(&self) -> &[SensorFlags] {
        &self.flags
    }

    /// Return the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Return `true` if there are no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Feature matrix, `features[sample][sensor]`.
    #[must_use]
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.readings.iter().map(SensorReading::to_features).collect()
    }

    /// Tier class indices.
    #[must_use]
    pub fn tier_labels(&self) -> Vec<usize> {
        self.tiers.iter().map(|t| t.index()).collect()
    }

    /// Flag label matrix, `matrix[sample][sensor]` in 0/1.
    #[must_use]
    pub fn flag_matrix(&self) -> Vec<Vec<usize>> {
        self.flags.iter().map(SensorFlags::to_labels).collect()
    }

    /// Copy out the samples at `indices`, in that order.
    #[must_use]
    pub fn subset(&self, indices: &[usize]) -> Self {
        let mut out = Self::new();
        for &i in indices {
            out.push(self.readings[i], self.tiers[i], self.flags[i]);
        }
        out
    }
}
