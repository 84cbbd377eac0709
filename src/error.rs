//! Error kinds for the offering engine and its upstream sources.
//!
//! [`EngineError`] is what every exposed operation returns. Caller-input
//! problems (bad semester code, bad range, unknown identifiers) are kept
//! distinct from [`EngineError::UpstreamUnavailable`], the only kind that
//! indicates a server-side failure. Missing grade statistics are not an error
//! at all: the aggregator degrades the response to null fields instead.

use thiserror::Error;

/// Errors surfaced by the engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    // ---
    /// Semester code that is not an integer, is outside `[1000, 9999]` or has
    /// a term digit other than 1, 4, 7. Carries the text as received.
    #[error("Invalid semester code: {0}")]
    InvalidSemesterCode(String),

    /// Unrecognized enrollment history range literal.
    #[error("Invalid range '{0}', expected one of 1yr, 3yr, 5yr")]
    InvalidRange(String),

    #[error("Department {dept_id} not found")]
    DepartmentNotFound { dept_id: i64 },

    /// Course is unknown, or belongs to a different department than requested.
    #[error("Course {course_id} not found")]
    CourseNotFound { course_id: i64 },

    /// Valid course and semester, but no sections were scheduled.
    #[error("No offering of course {course_id} in semester {semester_code}")]
    OfferingNotFound { course_id: i64, semester_code: u16 },

    /// A required collaborator (catalog or enrollment) failed or timed out.
    #[error("{source_name} unavailable: {message}")]
    UpstreamUnavailable {
        source_name: &'static str,
        message: String,
    },
}

impl EngineError {
    /// Returns true if the error was caused by the caller's input rather than
    /// by a failing collaborator.
    pub fn is_client_error(&self) -> bool {
        // ---
        !matches!(self, EngineError::UpstreamUnavailable { .. })
    }

    pub(crate) fn upstream(source_name: &'static str, err: impl std::fmt::Display) -> Self {
        EngineError::UpstreamUnavailable {
            source_name,
            message: err.to_string(),
        }
    }
}

/// Errors reported by catalog, enrollment and grade statistics sources.
#[derive(Debug, Error)]
pub enum SourceError {
    // ---
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Upstream answered with a non-success status.
    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Upstream payload did not have the expected shape.
    #[error("Malformed upstream data: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_only_upstream_is_server_side() {
        // ---
        assert!(EngineError::InvalidSemesterCode("1000".into()).is_client_error());
        assert!(EngineError::InvalidRange("bogus".into()).is_client_error());
        assert!(EngineError::DepartmentNotFound { dept_id: 1 }.is_client_error());
        assert!(!EngineError::upstream("enrollment", "timed out").is_client_error());
    }

    #[test]
    fn test_messages_name_the_input() {
        // ---
        let err = EngineError::OfferingNotFound {
            course_id: 42,
            semester_code: 1257,
        };
        assert_eq!(err.to_string(), "No offering of course 42 in semester 1257");

        let err = EngineError::upstream("catalog", SourceError::Malformed("no rows".into()));
        assert_eq!(
            err.to_string(),
            "catalog unavailable: Malformed upstream data: no rows"
        );
    }
}
