//! Model serialization and deserialization via bincode.

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument};

use crate::error::TreeError;
use crate::multilabel::MultiLabelModel;
use crate::tree::DecisionTree;

/// Current binary format version.
pub const FORMAT_VERSION: u32 = 1;

/// Leading fields of every model file, checked before the payload is decoded.
#[derive(serde::Deserialize)]
struct EnvelopeHeader {
    format_version: u32,
    kind: String,
}

/// Versioned envelope for a serialized model.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope<T> {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Which model type the payload holds.
    kind: String,
    /// The serialized model.
    model: T,
}

/// A model that can be written to and read back from a binary file.
///
/// Files are bincode-encoded envelopes carrying [`FORMAT_VERSION`] and
/// [`PersistentModel::KIND`], so loading a file written by another model
/// type or format version fails cleanly.
pub trait PersistentModel: Serialize + DeserializeOwned {
    /// Tag stored in the envelope.
    const KIND: &'static str;

    /// Save the model to a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::SerializeModel`] | bincode encoding failed |
    /// | [`TreeError::WriteModel`] | file write failed |
    fn save(&self, path: impl AsRef<Path>) -> Result<(), TreeError> {
        write_envelope(self, Self::KIND, path.as_ref())
    }

    /// Load a model from a binary file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`TreeError::ReadModel`] | file read failed |
    /// | [`TreeError::DeserializeModel`] | bincode decoding failed |
    /// | [`TreeError::IncompatibleModelVersion`] | format version mismatch |
    /// | [`TreeError::ModelKindMismatch`] | file holds another model type |
    fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        read_envelope(Self::KIND, path.as_ref())
    }
}

impl PersistentModel for DecisionTree {
    const KIND: &'static str = "decision-tree";
}

impl PersistentModel for MultiLabelModel {
    const KIND: &'static str = "multi-label";
}

#[instrument(skip(model, path), fields(path = %path.display()))]
fn write_envelope<T: Serialize>(model: &T, kind: &str, path: &Path) -> Result<(), TreeError> {
    let envelope = ModelEnvelope {
        format_version: FORMAT_VERSION,
        kind: kind.to_string(),
        model,
    };

    let bytes =
        bincode::serialize(&envelope).map_err(|e| TreeError::SerializeModel { source: e })?;

    std::fs::write(path, &bytes).map_err(|e| TreeError::WriteModel {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(size_bytes = bytes.len(), kind = kind, "model saved");

    Ok(())
}

#[instrument(skip(path), fields(path = %path.display()))]
fn read_envelope<T: DeserializeOwned>(kind: &'static str, path: &Path) -> Result<T, TreeError> {
    let bytes = std::fs::read(path).map_err(|e| TreeError::ReadModel {
        path: path.to_path_buf(),
        source: e,
    })?;

    let deserialize_error = |e| TreeError::DeserializeModel {
        path: path.to_path_buf(),
        source: e,
    };

    let header: EnvelopeHeader = bincode::deserialize(&bytes).map_err(deserialize_error)?;

    if header.format_version != FORMAT_VERSION {
        return Err(TreeError::IncompatibleModelVersion {
            expected: FORMAT_VERSION,
            found: header.format_version,
            path: path.to_path_buf(),
        });
    }
    if header.kind != kind {
        return Err(TreeError::ModelKindMismatch {
            expected: kind,
            found: header.kind,
            path: path.to_path_buf(),
        });
    }

    let envelope: ModelEnvelope<T> = bincode::deserialize(&bytes).map_err(deserialize_error)?;

    debug!(size_bytes = bytes.len(), kind = kind, "model loaded");

    Ok(envelope.model)
}
