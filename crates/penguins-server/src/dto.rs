use serde::{Deserialize, Serialize};

// === HTTP DTOs ===

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictRequest {
    pub features: Vec<f64>,
}

/// Both fields carry the predicted label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub label: String,
}

impl PredictionResponse {
    pub fn new(label: String) -> Self {
        Self {
            prediction: label.clone(),
            label,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
