//! Sensor domain types, feature scaling, synthetic training data and CSV
//! input for the airsense pipeline.

mod domain;
mod error;
mod reader;
mod scaler;
mod split;
mod synth;

pub use domain::{QualityTier, Sensor, SensorFlags, SensorReading, TrainingData};
pub use error::DataError;
pub use reader::ReadingsReader;
pub use scaler::StandardScaler;
pub use split::{SplitIndices, train_test_split};
pub use synth::{SYNTHETIC_SAMPLES, generate_training_data};
