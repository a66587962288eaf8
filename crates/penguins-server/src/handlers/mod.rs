//! HTTP route handlers for the prediction server.

pub mod predict;

use axum::Json;

use crate::dto::{HealthResponse, MessageResponse};

/// Welcome endpoint.
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Penguins prediction API!",
    })
}

/// Health check endpoint. Independent of database and model state.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}
