//! Read-only collaborators feeding the offering aggregator.
//!
//! Each source sits behind its own trait so the aggregator can query them
//! independently: the catalog and enrollment data are required, grade
//! statistics are optional and may lag behind.
//!
//! Implementations:
//! - [`catalog::PgCatalog`]: departments and courses from PostgreSQL
//! - [`grades::PgGradeStats`]: historical grade statistics from PostgreSQL
//! - [`coursys::CourSysClient`]: live section enrollment over HTTP
//! - [`memory::MemorySources`]: fixed in-memory data for tests and local runs

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::{Course, CourseKey, Department, GradeStats, SectionRecord};
use crate::semester::SemesterCode;

pub mod catalog;
pub mod coursys;
pub mod grades;
pub mod memory;

pub use catalog::PgCatalog;
pub use coursys::CourSysClient;
pub use grades::PgGradeStats;
pub use memory::MemorySources;

// ---

/// Department and course reference data. Unknown identifiers yield `None`.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ---
    async fn departments(&self) -> Result<Vec<Department>, SourceError>;

    async fn department(&self, dept_id: i64) -> Result<Option<Department>, SourceError>;

    async fn courses(&self, dept_id: i64) -> Result<Vec<Course>, SourceError>;

    async fn course(&self, course_id: i64) -> Result<Option<Course>, SourceError>;
}

/// Live per-section enrollment rows.
#[async_trait]
pub trait EnrollmentSource: Send + Sync {
    // ---
    /// Sections of `course` across at most `max_semesters` semesters, ending
    /// at `latest` and walking backwards.
    ///
    /// The caller applies no overall deadline to this call. Implementations
    /// that issue one request per semester must bound each request, and may
    /// report a semester the upstream refuses to serve as having no sections.
    async fn sections(
        &self,
        course: &CourseKey,
        latest: SemesterCode,
        max_semesters: usize,
    ) -> Result<Vec<SectionRecord>, SourceError>;

    /// Sections of `course` in exactly one semester.
    async fn semester_sections(
        &self,
        course: &CourseKey,
        semester: SemesterCode,
    ) -> Result<Vec<SectionRecord>, SourceError>;
}

/// Historical grade statistics, keyed by course only.
#[async_trait]
pub trait GradeStatsSource: Send + Sync {
    // ---
    /// `Ok(None)` when the course has no statistics yet; that is not an error.
    async fn grade_stats(&self, course_id: i64) -> Result<Option<GradeStats>, SourceError>;
}
