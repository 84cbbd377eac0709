//! In-memory sources holding a fixed snapshot of catalog, enrollment and
//! grade data. Used by tests and for running the service without upstreams.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::{CatalogRepository, EnrollmentSource, GradeStatsSource};
use crate::error::SourceError;
use crate::models::{Course, CourseKey, Department, GradeStats, SectionRecord};
use crate::semester::SemesterCode;

// ---

#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    departments: Vec<Department>,
    courses: Vec<Course>,
    sections: HashMap<i64, Vec<SectionRecord>>,
    grade_stats: HashMap<i64, GradeStats>,
    failing_catalog: bool,
    failing_enrollment: bool,
    failing_grades: bool,
    enrollment_delay: Option<Duration>,
    grade_delay: Option<Duration>,
}

impl MemorySources {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_department(mut self, department: Department) -> Self {
        self.departments.push(department);
        self
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    pub fn with_sections(mut self, course_id: i64, sections: Vec<SectionRecord>) -> Self {
        self.sections.entry(course_id).or_default().extend(sections);
        self
    }

    pub fn with_grade_stats(mut self, course_id: i64, stats: GradeStats) -> Self {
        self.grade_stats.insert(course_id, stats);
        self
    }

    /// Make every catalog lookup fail.
    pub fn failing_catalog(mut self) -> Self {
        self.failing_catalog = true;
        self
    }

    /// Make every enrollment lookup fail.
    pub fn failing_enrollment(mut self) -> Self {
        self.failing_enrollment = true;
        self
    }

    /// Make every grade statistics lookup fail.
    pub fn failing_grades(mut self) -> Self {
        self.failing_grades = true;
        self
    }

    /// Delay every enrollment lookup, window or single semester alike.
    pub fn with_enrollment_delay(mut self, delay: Duration) -> Self {
        self.enrollment_delay = Some(delay);
        self
    }

    /// Delay every grade statistics lookup.
    pub fn with_grade_delay(mut self, delay: Duration) -> Self {
        self.grade_delay = Some(delay);
        self
    }

    fn check(failing: bool, source_name: &str) -> Result<(), SourceError> {
        if failing {
            return Err(SourceError::Malformed(format!("{source_name} is offline")));
        }
        Ok(())
    }

    async fn pause(delay: Option<Duration>) {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn course_sections(&self, course_id: i64) -> impl Iterator<Item = &SectionRecord> {
        self.sections.get(&course_id).into_iter().flatten()
    }
}

#[async_trait]
impl CatalogRepository for MemorySources {
    // ---
    async fn departments(&self) -> Result<Vec<Department>, SourceError> {
        Self::check(self.failing_catalog, "catalog")?;
        let mut departments = self.departments.clone();
        departments.sort_by(|a, b| a.dept_code.cmp(&b.dept_code));
        Ok(departments)
    }

    async fn department(&self, dept_id: i64) -> Result<Option<Department>, SourceError> {
        Self::check(self.failing_catalog, "catalog")?;
        Ok(self.departments.iter().find(|d| d.dept_id == dept_id).cloned())
    }

    async fn courses(&self, dept_id: i64) -> Result<Vec<Course>, SourceError> {
        Self::check(self.failing_catalog, "catalog")?;
        let mut courses: Vec<Course> = self
            .courses
            .iter()
            .filter(|c| c.dept_id == dept_id)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.course_number.cmp(&b.course_number));
        Ok(courses)
    }

    async fn course(&self, course_id: i64) -> Result<Option<Course>, SourceError> {
        Self::check(self.failing_catalog, "catalog")?;
        Ok(self.courses.iter().find(|c| c.course_id == course_id).cloned())
    }
}

#[async_trait]
impl EnrollmentSource for MemorySources {
    // ---
    async fn sections(
        &self,
        course: &CourseKey,
        latest: SemesterCode,
        max_semesters: usize,
    ) -> Result<Vec<SectionRecord>, SourceError> {
        // ---
        Self::pause(self.enrollment_delay).await;
        Self::check(self.failing_enrollment, "enrollment")?;
        let window = latest.recent(max_semesters);
        Ok(self
            .course_sections(course.course_id)
            .filter(|s| window.contains(&s.semester_code))
            .cloned()
            .collect())
    }

    async fn semester_sections(
        &self,
        course: &CourseKey,
        semester: SemesterCode,
    ) -> Result<Vec<SectionRecord>, SourceError> {
        // ---
        Self::pause(self.enrollment_delay).await;
        Self::check(self.failing_enrollment, "enrollment")?;
        Ok(self
            .course_sections(course.course_id)
            .filter(|s| s.semester_code == semester)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GradeStatsSource for MemorySources {
    // ---
    async fn grade_stats(&self, course_id: i64) -> Result<Option<GradeStats>, SourceError> {
        // ---
        Self::pause(self.grade_delay).await;
        Self::check(self.failing_grades, "grade statistics")?;
        Ok(self.grade_stats.get(&course_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::Count;

    fn section(code: i64, name: &str) -> SectionRecord {
        // ---
        SectionRecord {
            section: name.to_string(),
            info_url: String::new(),
            semester_code: SemesterCode::new(code).unwrap(),
            location: None,
            instructors: String::new(),
            enrolled: Count::parse("1"),
            capacity: Count::parse("2"),
        }
    }

    fn key(course_id: i64) -> CourseKey {
        CourseKey {
            course_id,
            dept_code: "CMPT".to_string(),
            course_number: "276".to_string(),
        }
    }

    #[test]
    fn test_sections_window() {
        // ---
        let sources = MemorySources::new().with_sections(
            7,
            vec![section(1257, "D100"), section(1254, "D100"), section(1241, "D100")],
        );
        let latest = SemesterCode::new(1257).unwrap();

        let rows = tokio_test::block_on(sources.sections(&key(7), latest, 2)).unwrap();
        assert_eq!(rows.len(), 2);

        let rows = tokio_test::block_on(sources.semester_sections(&key(7), latest)).unwrap();
        assert_eq!(rows.len(), 1);

        let rows = tokio_test::block_on(sources.sections(&key(8), latest, 12)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_failure_switches() {
        // ---
        let sources = MemorySources::new().failing_grades();
        assert!(tokio_test::block_on(sources.grade_stats(1)).is_err());
        assert!(tokio_test::block_on(sources.departments()).is_ok());
    }
}
