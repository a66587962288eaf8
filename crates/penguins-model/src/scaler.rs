//! Feature standardization fitted by the external training job.

use ndarray::{Array1, Array2};
use serde::Deserialize;

use crate::PredictError;

/// On-disk scaler layout: `{"mean": [...], "scale": [...]}`.
#[derive(Deserialize)]
struct ScalerArtifact {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

/// Standard scaler: subtracts the per-feature mean and divides by the scale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ScalerArtifact")]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl TryFrom<ScalerArtifact> for StandardScaler {
    type Error = String;

    fn try_from(raw: ScalerArtifact) -> Result<Self, Self::Error> {
        Self::new(Array1::from(raw.mean), Array1::from(raw.scale))
    }
}

impl StandardScaler {
    /// Builds a scaler from fitted parameters. A zero scale is stored as 1.0
    /// (constant feature).
    pub fn new(mean: Array1<f64>, scale: Array1<f64>) -> Result<Self, String> {
        if mean.is_empty() {
            return Err("scaler has no features".into());
        }
        if mean.len() != scale.len() {
            return Err(format!(
                "scaler mean has {} entries but scale has {}",
                mean.len(),
                scale.len()
            ));
        }
        if mean.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".into());
        }
        let scale = scale.mapv(|s| if s == 0.0 { 1.0 } else { s });
        Ok(Self { mean, scale })
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Scales every row of `x`.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, PredictError> {
        if x.ncols() != self.n_features() {
            return Err(PredictError::Inference(format!(
                "X has {} features, but StandardScaler is expecting {} features as input",
                x.ncols(),
                self.n_features()
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::Inference("input contains a non-finite value".into()));
        }
        Ok((x - &self.mean) / &self.scale)
    }
}
