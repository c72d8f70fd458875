//! Model serialization and deserialization via bincode.

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::LearnerError;
use crate::learner::Learner;

/// Current binary format version.
pub const FORMAT_VERSION: u32 = 1;

/// Versioned envelope around a serialized model.
#[derive(Serialize, Deserialize)]
struct ModelEnvelope<M> {
    format_version: u32,
    model: M,
}

/// Binary persistence for any serializable learner.
///
/// Node sequences, hyperparameters and the trained flag round-trip exactly.
/// Random generators are not stored: a decoded model predicts identically but
/// draws fresh entropy if it is trained again.
pub trait Persist: Learner + Serialize + DeserializeOwned {
    /// Encodes the model in a versioned envelope.
    fn to_bytes(&self) -> Result<Vec<u8>, LearnerError> {
        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            model: self,
        };
        bincode::serialize(&envelope).map_err(|source| LearnerError::SerializeModel { source })
    }

    /// Decodes a model and checks its node layout.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`LearnerError::DeserializeModel`] | bincode decoding failed |
    /// | [`LearnerError::IncompatibleModelVersion`] | format version mismatch |
    /// | [`LearnerError::CorruptTree`] | a node sequence is not a valid pre-order tree |
    fn from_bytes(bytes: &[u8]) -> Result<Self, LearnerError> {
        let envelope: ModelEnvelope<Self> = bincode::deserialize(bytes)
            .map_err(|source| LearnerError::DeserializeModel { source })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(LearnerError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: envelope.format_version,
            });
        }
        envelope.model.validate()?;
        Ok(envelope.model)
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    fn save(&self, path: impl AsRef<Path>) -> Result<(), LearnerError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        std::fs::write(path, &bytes).map_err(|source| LearnerError::WriteModel {
            path: path.to_path_buf(),
            source,
        })?;

        info!(size_bytes = bytes.len(), "model saved");
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    fn load(path: impl AsRef<Path>) -> Result<Self, LearnerError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LearnerError::ReadModel {
            path: path.to_path_buf(),
            source,
        })?;

        let model = Self::from_bytes(&bytes)?;
        debug!(size_bytes = bytes.len(), "model loaded");
        Ok(model)
    }
}

impl<M: Learner + Serialize + DeserializeOwned> Persist for M {}
