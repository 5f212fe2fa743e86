//! HTTP error rendering
//!
//! All handlers return `Result<T, ApiError>`; [`ApiError`] wraps the shared
//! [`AppError`] taxonomy and is the single point where structured errors are
//! rendered into a transport response. No intermediate layer catches and
//! reinterprets them.
//!
//! The response body is `{type, title, status, detail}`; 304 renders with no
//! body. Internal (500-class) details are logged, never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use taskdock_shared::error::AppError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Transport-facing wrapper around the shared error taxonomy
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable error tag
    #[serde(rename = "type")]
    pub kind: String,

    /// Short human title
    pub title: String,

    /// HTTP status code, repeated in the body
    pub status: u16,

    /// Human-readable detail
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // 304 must not carry a body.
        if status == StatusCode::NOT_MODIFIED {
            return status.into_response();
        }

        let detail = if status.is_server_error() {
            tracing::error!(error = %err, "request failed with internal error");
            "An unexpected error occurred. Please try again later.".to_string()
        } else {
            err.to_string()
        };

        let body = Json(ErrorBody {
            kind: err.kind(),
            title: err.title().to_string(),
            status: status.as_u16(),
            detail,
        });

        (status, body).into_response()
    }
}
