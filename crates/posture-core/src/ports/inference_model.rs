//! Inference model port.

use crate::domain::Frame;
use crate::error::LoadError;
use crate::inference::RawPrediction;

/// Port for an object-detection model.
///
/// Model configuration (thresholds, classes, detection limit) is fixed when
/// the model is loaded, not passed per call.
pub trait InferenceModel: Send + Sync {
    /// Loads the model weights and applies the load-time configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the model cannot be found or initialized.
    fn load(self) -> Result<Self, LoadError>
    where
        Self: Sized;

    /// Runs the model on one frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is not loaded or inference fails.
    fn predict(&self, frame: &Frame) -> anyhow::Result<RawPrediction>;
}
