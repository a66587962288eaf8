//! Artifact loading and inference for the penguins prediction API.
//!
//! A [`ModelBundle`] is loaded once at startup and never mutated afterwards.
//! When loading fails the bundle stays [`ModelBundle::Empty`] and every
//! prediction reports [`PredictError::ModelUnavailable`].

mod artifact;
mod classifier;
mod scaler;

pub use artifact::{load_model_bundle, try_load, ArtifactError, DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
pub use classifier::{Classifier, DecisionTree, LinearModel};
pub use scaler::StandardScaler;

use ndarray::Array2;
use thiserror::Error;
use tracing::debug;

/// Errors from the inference path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("ML models not loaded")]
    ModelUnavailable,

    #[error("{0}")]
    Inference(String),
}

/// A loaded classifier paired with the scaler it was trained behind.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub classifier: Classifier,
    pub scaler: StandardScaler,
}

impl Model {
    pub fn new(classifier: Classifier, scaler: StandardScaler) -> Self {
        Self { classifier, scaler }
    }

    /// Scales a single feature vector and returns the predicted label.
    pub fn predict(&self, features: &[f64]) -> Result<String, PredictError> {
        let x = Array2::from_shape_vec((1, features.len()), features.to_vec())
            .map_err(|e| PredictError::Inference(e.to_string()))?;
        debug!("Input array: {:?}, shape: {:?}", x, x.shape());

        let scaled = self.scaler.transform(&x)?;
        debug!("Scaled input: {:?}", scaled);

        let label = self
            .classifier
            .predict(&scaled)?
            .into_iter()
            .next()
            .ok_or_else(|| PredictError::Inference("classifier returned no output".into()))?;
        debug!("Predicted: {}", label);
        Ok(label)
    }
}

/// The process-wide model state: either both artifacts or neither.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModelBundle {
    Loaded(Model),
    #[default]
    Empty,
}

impl ModelBundle {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelBundle::Loaded(_))
    }

    /// Predicts a label, or fails fast when no model was loaded.
    pub fn predict(&self, features: &[f64]) -> Result<String, PredictError> {
        let ModelBundle::Loaded(model) = self else {
            return Err(PredictError::ModelUnavailable);
        };
        model.predict(features)
    }
}

impl From<Model> for ModelBundle {
    fn from(model: Model) -> Self {
        ModelBundle::Loaded(model)
    }
}
