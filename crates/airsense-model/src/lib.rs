//! Air-quality model bundle: assessment of single readings, the training
//! pipeline, and an atomically swappable registry of the serving model.

mod bundle;
mod error;
mod evaluation;
mod registry;
mod train;

pub use bundle::{AirQualityModel, Assessment, DETECTION_MARKER, ProblematicSensor, Severity};
pub use error::ModelError;
pub use evaluation::{TierEvaluation, TierRow};
pub use registry::ModelRegistry;
pub use train::{TrainingConfig, TrainingReport, train, train_on};
