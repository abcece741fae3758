use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::sections::SectionId;

/// Rejection raised by an engine operation.
///
/// Every variant is local and recoverable: the operation that produced it left
/// the certificate exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid unit: '{0}'")]
    InvalidUnit(String),

    #[error("Section {0} not found")]
    NotFound(SectionId),

    #[error("Index {index} is out of bounds for {len} sections")]
    InvalidIndex { index: usize, len: usize },

    #[error("Page {page} is out of range (1..={total_pages})")]
    OutOfRange { page: u32, total_pages: u32 },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl EditError {
    fn code(&self) -> &'static str {
        match self {
            EditError::InvalidValue(_) => "INVALID_VALUE",
            EditError::InvalidUnit(_) => "INVALID_UNIT",
            EditError::NotFound(_) => "SECTION_NOT_FOUND",
            EditError::InvalidIndex { .. } => "INVALID_INDEX",
            EditError::OutOfRange { .. } => "OUT_OF_RANGE",
            EditError::InvalidPayload(_) => "INVALID_PAYLOAD",
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections render as [`AppError`] bodies.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Edit(e) => {
                let status = match e {
                    EditError::NotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.code(), e.to_string())
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
