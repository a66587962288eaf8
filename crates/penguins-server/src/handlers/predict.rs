//! Prediction HTTP handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use penguins_store::PredictionRecord;
use tracing::info;

use crate::dto::{PredictRequest, PredictionResponse};
use crate::error::AppError;
use crate::extract::AppJson;
use crate::services::prediction as prediction_service;
use crate::state::AppState;

/// POST /predict - Classify one feature vector.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<PredictRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    let label = prediction_service::predict(&state, &req.features)?;
    info!("Predicted {} for {} features", label, req.features.len());

    prediction_service::record_prediction(&state, &req.features, &label).await;

    Ok(Json(PredictionResponse::new(label)))
}

/// GET /predictions - List stored predictions.
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PredictionRecord>>, AppError> {
    let records = prediction_service::list_predictions(&state).await?;
    Ok(Json(records))
}
