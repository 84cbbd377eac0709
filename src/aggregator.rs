//! Offering aggregator.
//!
//! Resolves courses against the catalog, pulls live sections from the
//! enrollment source and historical statistics from the grade source, and
//! builds the list and detail views served to clients.
//!
//! Enrollment data is required: if it cannot be fetched the request fails
//! with [`EngineError::UpstreamUnavailable`]. Grade statistics are optional:
//! when they are missing, failing or late the views carry null grade fields
//! and the request still succeeds.
//!
//! Every upstream call is bounded by the configured timeout. Single requests
//! are wrapped here; multi-semester windows fan out into many requests, so
//! the enrollment source bounds each of those itself. Dropping the returned
//! future (e.g. when the inbound request is cancelled) drops every in-flight
//! fetch with it.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::clock::Clock;
use crate::error::{EngineError, SourceError};
use crate::history::{self, HistoryRange};
use crate::models::{
    AboutInfo, Course, CourseKey, CourseOffering, Department, GradeDistribution, GradeStats,
    GraphDataPoint, OfferingDetail, SectionRecord,
};
use crate::semester::SemesterCode;
use crate::sources::{CatalogRepository, EnrollmentSource, GradeStatsSource};

/// Number of most recent semesters covered by the offering list.
pub const OFFERING_WINDOW: usize = 12;

// ---

/// Static values the aggregator needs besides its sources.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub about: AboutInfo,
    /// Course outline page, e.g. `https://www.sfu.ca/outlines.html`.
    pub outline_base_url: String,
    /// Deadline for each upstream call.
    pub upstream_timeout: Duration,
}

pub struct OfferingAggregator {
    catalog: Arc<dyn CatalogRepository>,
    enrollment: Arc<dyn EnrollmentSource>,
    grades: Arc<dyn GradeStatsSource>,
    clock: Arc<dyn Clock>,
    settings: AggregatorSettings,
}

impl OfferingAggregator {
    // ---
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        enrollment: Arc<dyn EnrollmentSource>,
        grades: Arc<dyn GradeStatsSource>,
        clock: Arc<dyn Clock>,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            catalog,
            enrollment,
            grades,
            clock,
            settings,
        }
    }

    pub fn about(&self) -> AboutInfo {
        self.settings.about.clone()
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, EngineError> {
        self.required("catalog", self.catalog.departments()).await
    }

    /// Courses of a department; fails with `DepartmentNotFound` for an unknown id.
    pub async fn list_courses(&self, dept_id: i64) -> Result<Vec<Course>, EngineError> {
        // ---
        self.required("catalog", self.catalog.department(dept_id))
            .await?
            .ok_or(EngineError::DepartmentNotFound { dept_id })?;

        self.required("catalog", self.catalog.courses(dept_id)).await
    }

    /// Sections of a course over the most recent [`OFFERING_WINDOW`] semesters,
    /// newest semester first, then by section.
    pub async fn list_offerings(
        &self,
        dept_id: i64,
        course_id: i64,
    ) -> Result<Vec<CourseOffering>, EngineError> {
        // ---
        let (department, course) = self.resolve_course(dept_id, course_id).await?;
        let current = self.clock.current_semester()?;
        let key = CourseKey::new(&department, &course);

        let rows = self
            .windowed(
                "enrollment",
                self.enrollment
                    .sections(&key, enrolling_anchor(current), OFFERING_WINDOW),
            )
            .await?;

        debug!(
            "{} {}: {} section rows fetched",
            department.dept_code,
            course.course_number,
            rows.len()
        );
        Ok(build_offerings(rows, current))
    }

    /// One course in one semester with all its sections and grade statistics.
    pub async fn get_offering_detail(
        &self,
        dept_id: i64,
        course_id: i64,
        semester_code: i64,
    ) -> Result<OfferingDetail, EngineError> {
        // ---
        let semester = SemesterCode::new(semester_code)?;
        let (department, course) = self.resolve_course(dept_id, course_id).await?;
        let key = CourseKey::new(&department, &course);

        // Independent sources: fetch together, a grade failure only blanks grades
        let (sections, stats) = tokio::join!(
            self.required(
                "enrollment",
                self.enrollment.semester_sections(&key, semester)
            ),
            self.optional_grade_stats(course_id),
        );

        let sections = sections?;
        if sections.is_empty() {
            return Err(EngineError::OfferingNotFound {
                course_id,
                semester_code: semester.get(),
            });
        }

        let current = self.clock.current_semester()?;
        Ok(build_detail(
            &department,
            &course,
            semester,
            sections,
            stats,
            current,
            &self.settings.outline_base_url,
        ))
    }

    /// Grade statistics of a course; null fields when none are recorded.
    pub async fn grade_distribution(
        &self,
        course_id: i64,
    ) -> Result<GradeDistribution, EngineError> {
        // ---
        let course = self
            .required("catalog", self.catalog.course(course_id))
            .await?
            .ok_or(EngineError::CourseNotFound { course_id })?;
        let department = self.department(course.dept_id).await?;
        let stats = self.optional_grade_stats(course_id).await;

        Ok(GradeDistribution {
            dept_code: department.dept_code,
            course_number: course.course_number,
            title: course.title,
            median_grade: stats.as_ref().and_then(|s| s.median_grade.clone()),
            fail_rate: stats.as_ref().and_then(|s| s.fail_rate),
            distribution: stats.map(|s| s.distribution),
        })
    }

    /// Per-semester enrollment totals over `range`, oldest first.
    pub async fn enrollment_history(
        &self,
        dept_id: i64,
        course_id: i64,
        range: HistoryRange,
    ) -> Result<Vec<GraphDataPoint>, EngineError> {
        // ---
        let (department, course) = self.resolve_course(dept_id, course_id).await?;
        let current = self.clock.current_semester()?;
        let key = CourseKey::new(&department, &course);
        let max_semesters = range.max_semesters();

        let rows = self
            .windowed(
                "enrollment",
                self.enrollment
                    .sections(&key, enrolling_anchor(current), max_semesters),
            )
            .await?;

        Ok(history::reduce(&rows, max_semesters))
    }

    // ---

    /// Look up a course and check it belongs to `dept_id`.
    async fn resolve_course(
        &self,
        dept_id: i64,
        course_id: i64,
    ) -> Result<(Department, Course), EngineError> {
        // ---
        let course = self
            .required("catalog", self.catalog.course(course_id))
            .await?
            .filter(|course| {
                if course.dept_id != dept_id {
                    debug!(
                        "Course {} belongs to department {}, not {}",
                        course_id, course.dept_id, dept_id
                    );
                }
                course.dept_id == dept_id
            })
            .ok_or(EngineError::CourseNotFound { course_id })?;

        let department = self.department(dept_id).await?;
        Ok((department, course))
    }

    async fn department(&self, dept_id: i64) -> Result<Department, EngineError> {
        self.required("catalog", self.catalog.department(dept_id))
            .await?
            .ok_or(EngineError::DepartmentNotFound { dept_id })
    }

    /// Await a required single-request source under the upstream deadline.
    async fn required<T>(
        &self,
        source_name: &'static str,
        fetch: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, EngineError> {
        // ---
        match tokio::time::timeout(self.settings.upstream_timeout, fetch).await {
            Ok(result) => settle(source_name, result),
            Err(_) => {
                error!(
                    "{} request timed out after {:?}",
                    source_name, self.settings.upstream_timeout
                );
                Err(EngineError::upstream(
                    source_name,
                    format!("timed out after {:?}", self.settings.upstream_timeout),
                ))
            }
        }
    }

    /// Await a required multi-semester window. Each request inside it is
    /// already bounded by the source, so no overall deadline is applied.
    async fn windowed<T>(
        &self,
        source_name: &'static str,
        fetch: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, EngineError> {
        settle(source_name, fetch.await)
    }

    /// Grade statistics, or `None` when absent, failing or late.
    async fn optional_grade_stats(&self, course_id: i64) -> Option<GradeStats> {
        // ---
        let fetch = self.grades.grade_stats(course_id);
        match tokio::time::timeout(self.settings.upstream_timeout, fetch).await {
            Ok(Ok(Some(stats))) => Some(stats),
            Ok(Ok(None)) => {
                warn!("No grade statistics for course {}", course_id);
                None
            }
            Ok(Err(e)) => {
                warn!(
                    "Grade statistics for course {} unavailable, serving partial data: {}",
                    course_id, e
                );
                None
            }
            Err(_) => {
                warn!(
                    "Grade statistics for course {} timed out, serving partial data",
                    course_id
                );
                None
            }
        }
    }
}

fn settle<T>(source_name: &'static str, result: Result<T, SourceError>) -> Result<T, EngineError> {
    // ---
    result.map_err(|e| {
        error!("{} request failed: {}", source_name, e);
        EngineError::upstream(source_name, e)
    })
}

/// Newest semester worth asking the enrollment source about: the term after
/// the current one, which is open for enrollment.
fn enrolling_anchor(current: SemesterCode) -> SemesterCode {
    current.next().unwrap_or(current)
}

/// Keep the [`OFFERING_WINDOW`] most recent semesters present in `rows` and
/// order by semester descending, then section ascending.
pub fn build_offerings(rows: Vec<SectionRecord>, current: SemesterCode) -> Vec<CourseOffering> {
    // ---
    let window: BTreeSet<SemesterCode> = rows
        .iter()
        .map(|row| row.semester_code)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .take(OFFERING_WINDOW)
        .collect();

    let mut offerings: Vec<CourseOffering> = rows
        .iter()
        .filter(|row| window.contains(&row.semester_code))
        .map(|row| row.to_offering(current))
        .collect();

    offerings.sort_by(|a, b| {
        b.semester_code
            .cmp(&a.semester_code)
            .then_with(|| a.section.cmp(&b.section))
    });
    offerings
}

/// Assemble the detail view from one semester's sections and the course's
/// (possibly missing) grade statistics.
pub fn build_detail(
    department: &Department,
    course: &Course,
    semester: SemesterCode,
    mut sections: Vec<SectionRecord>,
    stats: Option<GradeStats>,
    current: SemesterCode,
    outline_base_url: &str,
) -> OfferingDetail {
    // ---
    sections.sort_by(|a, b| a.section.cmp(&b.section));
    let campus = derive_campus(&sections);

    OfferingDetail {
        dept_code: department.dept_code.clone(),
        course_number: course.course_number.clone(),
        title: course.title.clone(),
        year: semester.year(),
        term: semester.term(),
        semester_code: semester,
        campus,
        median_grade: stats.as_ref().and_then(|s| s.median_grade.clone()),
        fail_rate: stats.as_ref().and_then(|s| s.fail_rate),
        distribution: stats.map(|s| s.distribution),
        description: course.description.clone(),
        prerequisites: course.prerequisites.clone(),
        corequisites: course.corequisites.clone(),
        units: course.units,
        degree_level: course.degree_level.clone(),
        designation: course.designation.clone(),
        sections: sections.iter().map(|s| s.to_offering(current)).collect(),
        outline_url: outline_url(
            outline_base_url,
            semester,
            &department.dept_code,
            &course.course_number,
        ),
    }
}

/// First non-blank location in section order.
///
/// Locations are not normalized upstream, so when sections report different
/// campuses this is a best-effort pick rather than a majority vote.
pub fn derive_campus(sections: &[SectionRecord]) -> Option<String> {
    // ---
    let mut distinct: Vec<&str> = Vec::new();
    for location in sections
        .iter()
        .filter_map(|s| s.location.as_deref())
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        if !distinct.contains(&location) {
            distinct.push(location);
        }
    }

    if distinct.len() > 1 {
        debug!("Sections span campuses {:?}, reporting the first", distinct);
    }
    distinct.first().map(|l| l.to_string())
}

/// `{base}?{year}/{term}/{dept}/{number}`, lowercased.
pub fn outline_url(
    base: &str,
    semester: SemesterCode,
    dept_code: &str,
    course_number: &str,
) -> String {
    format!(
        "{}?{}/{}/{}/{}",
        base.trim_end_matches('?'),
        semester.year(),
        semester.term().slug(),
        dept_code.to_lowercase(),
        course_number.to_lowercase()
    )
}
