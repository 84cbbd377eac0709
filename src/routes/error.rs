//! HTTP mapping of engine errors.
//!
//! Caller-input errors become 400/404 with the specific reason; a failing
//! required upstream becomes 502. Bodies are `{"error": ..., "code": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::error::EngineError;

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        // ---
        let (status, code) = match &self {
            EngineError::InvalidSemesterCode(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_SEMESTER_CODE")
            }
            EngineError::InvalidRange(_) => (StatusCode::BAD_REQUEST, "INVALID_RANGE"),
            EngineError::DepartmentNotFound { .. } => {
                (StatusCode::NOT_FOUND, "DEPARTMENT_NOT_FOUND")
            }
            EngineError::CourseNotFound { .. } => (StatusCode::NOT_FOUND, "COURSE_NOT_FOUND"),
            EngineError::OfferingNotFound { .. } => (StatusCode::NOT_FOUND, "OFFERING_NOT_FOUND"),
            EngineError::UpstreamUnavailable { .. } => {
                tracing::error!(error = %self, "Upstream unavailable");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE")
            }
        };

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
