//! Error types for the translation API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::storage::StageError;
use crate::translate::TranslateError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid auth key")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    #[error("unsupported translator service: {0}")]
    UnsupportedService(String),

    #[error(transparent)]
    Fetch(#[from] StageError),

    #[error(transparent)]
    Translation(#[from] TranslateError),

    #[error("{0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

/// Body of every error response
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error kind, e.g. `unauthorized` or `fetch_failed`
    pub error: String,
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnsupportedService(_) => StatusCode::BAD_REQUEST,
            AppError::Fetch(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Translation(_) | AppError::Io(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::Validation(_) => "validation_error",
            AppError::UnsupportedService(_) => "unsupported_service",
            AppError::Fetch(_) => "fetch_failed",
            AppError::Translation(_) => "translation_failed",
            AppError::NotFound(_) => "not_found",
            AppError::Io(_) => "io_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Translation(e) => tracing::error!("Translation error: {}", e),
            AppError::Io(e) => tracing::error!("IO error: {}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            other => tracing::debug!("Request rejected ({}): {}", status, other),
        }

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}
