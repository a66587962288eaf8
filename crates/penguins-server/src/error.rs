//! Application error types and Axum response conversion.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use penguins_model::PredictError;
use serde::Serialize;

/// Application-level errors with HTTP status code mapping.
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    /// The request body was rejected before reaching a handler.
    InvalidRequest { status: StatusCode, detail: String },
    ServiceUnavailable(String),
    Internal(String),
}

impl AppError {
    /// Creates an Internal error from any error type.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        AppError::Internal(e.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest { status, .. } => *status,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PredictError> for AppError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::ModelUnavailable => AppError::ServiceUnavailable(e.to_string()),
            PredictError::Inference(msg) => AppError::Internal(format!("Prediction error: {}", msg)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (AppError::InvalidRequest { detail, .. }
        | AppError::ServiceUnavailable(detail)
        | AppError::Internal(detail)) = self;
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
