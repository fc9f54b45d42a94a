//! API error mapping
//!
//! Input errors map to 400, missing resources to 404, everything unexpected
//! to 500. Soft external errors are absorbed before they reach this layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::application::errors::SourceError;

use super::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref message) = self {
            tracing::error!(error = %message, "Request failed");
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::InvalidRepositoryReference | SourceError::NoFilesFound => {
                ApiError::BadRequest(err.to_string())
            }
            SourceError::Api(_) => {
                ApiError::Internal(format!("Repository analysis failed: {}", err))
            }
        }
    }
}
