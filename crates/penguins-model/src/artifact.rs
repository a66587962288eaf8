//! Loading of classifier and scaler artifacts from disk.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{error, info};

use crate::{Classifier, Model, ModelBundle, StandardScaler};

/// Default location of the classifier artifact.
pub const DEFAULT_MODEL_PATH: &str = "models/penguins_model.json";
/// Default location of the scaler artifact.
pub const DEFAULT_SCALER_PATH: &str = "models/penguins_scaler.json";

/// Errors from reading an artifact file.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact {path}: {reason}")]
    Invalid { path: String, reason: String },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: display,
        source,
    })
}

/// Loads and validates both artifacts, reporting the first failure.
pub fn try_load(
    model_path: impl AsRef<Path>,
    scaler_path: impl AsRef<Path>,
) -> Result<Model, ArtifactError> {
    let model_path = model_path.as_ref();
    let scaler_path = scaler_path.as_ref();

    let classifier: Classifier = read_json(model_path)?;
    let scaler: StandardScaler = read_json(scaler_path)?;

    if let Some(width) = classifier.n_features() {
        if width != scaler.n_features() {
            return Err(ArtifactError::Invalid {
                path: model_path.display().to_string(),
                reason: format!(
                    "classifier expects {} features but scaler was fitted on {}",
                    width,
                    scaler.n_features()
                ),
            });
        }
    }

    Ok(Model { classifier, scaler })
}

/// Loads the model bundle, falling back to an empty bundle on any error.
///
/// An empty bundle keeps the service up with inference disabled until restart.
pub fn load_model_bundle(model_path: impl AsRef<Path>, scaler_path: impl AsRef<Path>) -> ModelBundle {
    match try_load(model_path, scaler_path) {
        Ok(model) => {
            info!(
                "Model loaded: {} classes, {} features",
                model.classifier.classes().len(),
                model.scaler.n_features()
            );
            ModelBundle::Loaded(model)
        }
        Err(e) => {
            error!("Model loading failed: {}", e);
            ModelBundle::Empty
        }
    }
}
