//! Inference, best-effort persistence and listing of predictions.

use penguins_store::{NewPrediction, PredictionRecord};
use tokio::task;
use tracing::{debug, error};

use crate::error::AppError;
use crate::state::AppState;

/// Predicts a label for one feature vector.
pub fn predict(state: &AppState, features: &[f64]) -> Result<String, AppError> {
    debug!("Received features: {:?}", features);
    state.model.predict(features).map_err(|e| {
        error!("Prediction error: {}", e);
        AppError::from(e)
    })
}

/// Stores a prediction, logging and swallowing any failure.
///
/// Called only after a successful inference; the caller's response never
/// depends on the outcome.
pub async fn record_prediction(state: &AppState, features: &[f64], label: &str) {
    let new = NewPrediction::new(features, label);
    let store = state.store.clone();

    match task::spawn_blocking(move || store.insert(&new)).await {
        Ok(Ok(record)) => debug!("Stored prediction {} ({})", record.id, record.prediction),
        Ok(Err(e)) => error!("DB save failed (non-critical): {:?}", e),
        Err(e) => error!("DB save task failed (non-critical): {}", e),
    }
}

/// Lists every stored prediction; storage failures surface as 503.
pub async fn list_predictions(state: &AppState) -> Result<Vec<PredictionRecord>, AppError> {
    let store = state.store.clone();
    let result = task::spawn_blocking(move || store.list())
        .await
        .map_err(AppError::internal)?;

    result.map_err(|e| {
        error!("DB query failed: {}", e);
        AppError::ServiceUnavailable("Database temporarily unavailable".into())
    })
}
