//! services/api/src/error.rs
//!
//! Defines the error types of the API service: bootstrap failures, and the
//! HTTP-facing error returned by handlers.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use studymate_core::StudioError;
use utoipa::ToSchema;

/// Startup failures of the `api` binary. Handler failures use [`HttpError`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error building or using the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// An error a handler returns to the client.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<StudioError> for HttpError {
    fn from(error: StudioError) -> Self {
        let status = match &error {
            StudioError::PreconditionUnmet(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StudioError::Busy(_) => StatusCode::CONFLICT,
            StudioError::NotFound(_) => StatusCode::NOT_FOUND,
            StudioError::AnalysisFailure(_) | StudioError::GenerationFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
            StudioError::PartialMediaFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}
