//! HTTP error responses
//!
//! Domain errors leave the services as RFC 7807 problem documents:
//!
//! ```json
//! {
//!   "type": "https://tools.ietf.org/html/rfc7231#section-6.5.4",
//!   "title": "Not Found",
//!   "status": 404,
//!   "detail": "Vehicle with registration ABC999 not found"
//! }
//! ```

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use threadpilot_domain::ThreadPilotError;
use tracing::{error, warn};

use crate::utils::logging::error_label;

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

/// RFC 7807 problem document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub detail: String,
}

impl ProblemDetails {
    /// Problem document for `status` with a human-readable `detail`
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        let (problem_type, title) = match status {
            StatusCode::BAD_REQUEST => {
                ("https://tools.ietf.org/html/rfc7231#section-6.5.1", "Bad Request")
            }
            StatusCode::NOT_FOUND => {
                ("https://tools.ietf.org/html/rfc7231#section-6.5.4", "Not Found")
            }
            _ => (
                "https://tools.ietf.org/html/rfc7231#section-6.6.1",
                "An error occurred while processing your request.",
            ),
        };
        Self { problem_type, title, status: status.as_u16(), detail: detail.into() }
    }
}

/// Error returned by every handler
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ThreadPilotError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ThreadPilotError::NotFound(_) => StatusCode::NOT_FOUND,
            ThreadPilotError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ThreadPilotError::Config(_)
            | ThreadPilotError::Network(_)
            | ThreadPilotError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let label = error_label(&self.0);

        // Server-side failures keep their detail out of the response body.
        let detail = match &self.0 {
            ThreadPilotError::NotFound(msg) | ThreadPilotError::InvalidInput(msg) => {
                warn!(error_kind = label, status = status.as_u16(), detail = %msg, "request failed");
                msg.clone()
            }
            other => {
                error!(error_kind = label, status = status.as_u16(), error = %other, "request failed");
                "An unexpected error occurred".to_string()
            }
        };

        let mut response = (status, Json(ProblemDetails::new(status, detail))).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_CONTENT_TYPE));
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
