use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use quill_core::SlugError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Slug generation failed: {0}")]
    Upstream(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl From<SlugError> for AppError {
    fn from(error: SlugError) -> Self {
        match error {
            SlugError::EmptyTitle => Self::BadRequest(error.to_string()),
            SlugError::InvalidConfiguration(message) => Self::Internal(message.to_string()),
            SlugError::Http(_) | SlugError::Api(_) => Self::Upstream(error.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Downstream generation failures are reported as 500, not 502:
            // the client contract only distinguishes bad input from failure.
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        let response = AppError::bad_request("title is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upstream_and_internal_map_to_500() {
        let response = AppError::Upstream("backend down".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::Internal("misconfigured".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_title_converts_to_bad_request() {
        let error = AppError::from(SlugError::EmptyTitle);
        assert!(matches!(error, AppError::BadRequest(_)));
    }

    #[test]
    fn api_failure_converts_to_upstream() {
        let error = AppError::from(SlugError::Api("model unavailable".to_string()));
        assert!(matches!(error, AppError::Upstream(_)));
    }
}
