//! Request extractors whose rejections render as `{"detail": ...}`.

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body extractor; a body that fails to parse becomes an [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
