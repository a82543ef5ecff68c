//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use cronpilot_domain::error::{CronpilotError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`CronpilotError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(CronpilotError);

impl ApiError {
    /// Error for a path segment that is not a valid identifier.
    #[must_use]
    pub fn invalid_id(raw: &str) -> Self {
        Self(ValidationError::InvalidId(raw.to_string()).into())
    }
}

impl From<CronpilotError> for ApiError {
    fn from(err: CronpilotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CronpilotError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            CronpilotError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            CronpilotError::Provider(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            CronpilotError::Action(err) => (StatusCode::BAD_GATEWAY, err.to_string()),
            CronpilotError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
