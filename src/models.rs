//! Data models for catalog records, live sections and derived offering views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::semester::{SemesterCode, Term};

// ---

/// Catalog department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    // ---
    pub dept_id: i64,
    pub dept_code: String,
    pub name: String,
}

/// Catalog course. Belongs to exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    // ---
    pub course_id: i64,
    pub dept_id: i64,
    pub course_number: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub units: Option<i32>,
    pub degree_level: Option<String>,
    pub prerequisites: Option<String>,
    pub corequisites: Option<String>,
    pub designation: Option<String>,
}

/// What the enrollment source needs to look up a course's sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseKey {
    pub course_id: i64,
    pub dept_code: String,
    pub course_number: String,
}

impl CourseKey {
    pub fn new(department: &Department, course: &Course) -> Self {
        CourseKey {
            course_id: course.course_id,
            dept_code: department.dept_code.clone(),
            course_number: course.course_number.clone(),
        }
    }
}

/// Enrollment or capacity figure as reported by the enrollment source.
///
/// Unreleased sections carry placeholder text such as `"TBA"`; those stay
/// [`Count::Unavailable`] and never take part in arithmetic. Either way the raw
/// text is kept and is what gets serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Count {
    Numeric { value: u32, raw: String },
    Unavailable(String),
}

impl Count {
    // ---
    /// Accepts plain integers and the waitlist form `"115 (+31)"`, which
    /// counts as `146`.
    pub fn parse(raw: &str) -> Self {
        match parse_count(raw) {
            Some(value) => Count::Numeric {
                value,
                raw: raw.to_string(),
            },
            None => Count::Unavailable(raw.to_string()),
        }
    }

    pub fn value(&self) -> Option<u32> {
        match self {
            Count::Numeric { value, .. } => Some(*value),
            Count::Unavailable(_) => None,
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            Count::Numeric { raw, .. } | Count::Unavailable(raw) => raw,
        }
    }
}

fn parse_count(raw: &str) -> Option<u32> {
    // ---
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u32>() {
        return Some(value);
    }

    let (base, waitlist) = raw.split_once('(')?;
    let base = base.trim().parse::<u32>().ok()?;
    let waitlist = waitlist
        .strip_suffix(')')?
        .trim()
        .strip_prefix('+')?
        .parse::<u32>()
        .ok()?;
    base.checked_add(waitlist)
}

impl From<String> for Count {
    fn from(raw: String) -> Self {
        Count::parse(&raw)
    }
}

impl From<Count> for String {
    fn from(count: Count) -> Self {
        match count {
            Count::Numeric { raw, .. } | Count::Unavailable(raw) => raw,
        }
    }
}

/// `round(enrolled / capacity * 100)` when both figures are numeric and
/// capacity is positive.
pub fn load_percent(enrolled: &Count, capacity: &Count) -> Option<u32> {
    // ---
    let enrolled = enrolled.value()?;
    let capacity = capacity.value().filter(|c| *c > 0)?;
    Some((f64::from(enrolled) * 100.0 / f64::from(capacity)).round() as u32)
}

/// One section of a course in one semester, straight from the enrollment source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    // ---
    pub section: String,
    pub info_url: String,
    pub semester_code: SemesterCode,
    pub location: Option<String>,
    pub instructors: String,
    pub enrolled: Count,
    pub capacity: Count,
}

/// List-view row: one section in one semester, with derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseOffering {
    // ---
    pub section: String,
    pub info_url: String,
    pub term: Term,
    pub year: i32,
    pub semester_code: SemesterCode,
    pub is_enrolling: bool,
    pub location: Option<String>,
    pub instructors: String,
    pub enrolled: Count,
    pub capacity: Count,
    pub load_percent: Option<u32>,
}

impl SectionRecord {
    // ---
    /// Derive the list-view row. Semesters at or after `current` are enrolling.
    pub fn to_offering(&self, current: SemesterCode) -> CourseOffering {
        // ---
        CourseOffering {
            section: self.section.clone(),
            info_url: self.info_url.clone(),
            term: self.semester_code.term(),
            year: self.semester_code.year(),
            semester_code: self.semester_code,
            is_enrolling: self.semester_code >= current,
            location: self.location.clone(),
            instructors: self.instructors.clone(),
            enrolled: self.enrolled.clone(),
            capacity: self.capacity.clone(),
            load_percent: load_percent(&self.enrolled, &self.capacity),
        }
    }
}

/// Historical grade statistics for a course, independent of semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeStats {
    // ---
    pub median_grade: Option<String>,
    pub fail_rate: Option<f64>,
    /// Letter grade to percentage of students.
    pub distribution: BTreeMap<String, f64>,
}

/// True for `A`-`F` optionally followed by `+` or `-`.
pub fn is_letter_grade(key: &str) -> bool {
    // ---
    let mut chars = key.chars();
    let letter_ok = matches!(chars.next(), Some('A'..='F'));
    let suffix_ok = match chars.next() {
        None => true,
        Some('+') | Some('-') => chars.next().is_none(),
        Some(_) => false,
    };
    letter_ok && suffix_ok
}

/// Detail view of one course in one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingDetail {
    // ---
    pub dept_code: String,
    pub course_number: String,
    pub title: Option<String>,

    pub year: i32,
    pub term: Term,
    pub semester_code: SemesterCode,
    pub campus: Option<String>,

    pub median_grade: Option<String>,
    pub fail_rate: Option<f64>,
    #[serde(rename = "gradeDistribution")]
    pub distribution: Option<BTreeMap<String, f64>>,

    pub description: Option<String>,
    pub prerequisites: Option<String>,
    pub corequisites: Option<String>,
    pub units: Option<i32>,
    pub degree_level: Option<String>,
    pub designation: Option<String>,

    pub sections: Vec<CourseOffering>,
    pub outline_url: String,
}

/// Grade statistics of a course, labelled with its catalog identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDistribution {
    // ---
    pub dept_code: String,
    pub course_number: String,
    pub title: Option<String>,
    pub median_grade: Option<String>,
    pub fail_rate: Option<f64>,
    #[serde(rename = "gradeDistribution")]
    pub distribution: Option<BTreeMap<String, f64>>,
}

/// Enrollment totals of one semester, for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDataPoint {
    // ---
    pub semester_code: SemesterCode,
    pub term: Term,
    pub year: i32,
    pub total_enrolled: u64,
    pub total_capacity: u64,
    pub load_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub app_name: String,
    pub author_name: String,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn create_test_section(enrolled: &str, capacity: &str) -> SectionRecord {
        // ---
        SectionRecord {
            section: "D100".to_string(),
            info_url: "/browse/info/2025fa-cmpt-276-d1".to_string(),
            semester_code: SemesterCode::new(1257).unwrap(),
            location: Some("Burnaby".to_string()),
            instructors: "Jane Doe".to_string(),
            enrolled: Count::parse(enrolled),
            capacity: Count::parse(capacity),
        }
    }

    fn current(code: i64) -> SemesterCode {
        SemesterCode::new(code).unwrap()
    }

    #[test]
    fn test_load_percent_numeric() {
        // ---
        let offering = create_test_section("96", "100").to_offering(current(1257));
        assert_eq!(offering.load_percent, Some(96));

        // 2/3 rounds to 67
        let offering = create_test_section("2", "3").to_offering(current(1257));
        assert_eq!(offering.load_percent, Some(67));
    }

    #[test]
    fn test_placeholder_counts_pass_through() {
        // ---
        let offering = create_test_section("TBA", "100").to_offering(current(1257));
        assert_eq!(offering.load_percent, None);
        assert_eq!(offering.enrolled, Count::Unavailable("TBA".to_string()));
        assert_eq!(offering.enrolled.raw(), "TBA");
        assert_eq!(offering.capacity.value(), Some(100));
    }

    #[test]
    fn test_waitlist_counts_as_enrolled() {
        // ---
        let offering = create_test_section("115 (+31)", "100").to_offering(current(1257));
        assert_eq!(offering.enrolled.value(), Some(146));
        assert_eq!(offering.enrolled.raw(), "115 (+31)");
        assert_eq!(offering.load_percent, Some(146));

        assert_eq!(Count::parse("115 (31)").value(), None);
        assert_eq!(Count::parse("(+31)").value(), None);
    }

    #[test]
    fn test_zero_capacity_has_no_load() {
        // ---
        let offering = create_test_section("0", "0").to_offering(current(1257));
        assert_eq!(offering.load_percent, None);
        assert_eq!(offering.enrolled.value(), Some(0));
    }

    #[test]
    fn test_is_enrolling_relative_to_current() {
        // ---
        let section = create_test_section("96", "100");
        assert!(section.to_offering(current(1254)).is_enrolling);
        assert!(section.to_offering(current(1257)).is_enrolling);
        assert!(!section.to_offering(current(1261)).is_enrolling);
    }

    #[test]
    fn test_offering_serializes_raw_counts() {
        // ---
        let offering = create_test_section("TBA", "100").to_offering(current(1257));
        let json = serde_json::to_value(&offering).unwrap();

        assert_eq!(json["semesterCode"], 1257);
        assert_eq!(json["term"], "Fall");
        assert_eq!(json["year"], 2025);
        assert_eq!(json["isEnrolling"], true);
        assert_eq!(json["enrolled"], "TBA");
        assert_eq!(json["capacity"], "100");
        assert!(json["loadPercent"].is_null());
        assert_eq!(json["infoUrl"], "/browse/info/2025fa-cmpt-276-d1");
    }

    #[test]
    fn test_letter_grades() {
        // ---
        for key in ["A+", "A", "A-", "B", "C-", "D", "F"] {
            assert!(is_letter_grade(key), "{key}");
        }
        for key in ["", "G", "a", "A+-", "Median Grade", "Fail Rate", "FD"] {
            assert!(!is_letter_grade(key), "{key}");
        }
    }
}
