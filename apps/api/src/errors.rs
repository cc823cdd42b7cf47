use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFormat(msg) => (
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Extraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                msg.clone(),
            ),
            AppError::Inference(msg) => {
                tracing::error!("Inference error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INFERENCE_ERROR",
                    "An ML processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
