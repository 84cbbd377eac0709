//! Enrollment history reducer.
//!
//! Folds raw section rows into one [`GraphDataPoint`] per semester for the
//! enrollment trend charts.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::EngineError;
use crate::models::{GraphDataPoint, SectionRecord};
use crate::semester::SemesterCode;

// ---

/// Time span of an enrollment history query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRange {
    OneYear,
    ThreeYears,
    #[default]
    FiveYears,
}

impl HistoryRange {
    // ---
    /// Three semesters per year.
    pub fn max_semesters(self) -> usize {
        match self {
            HistoryRange::OneYear => 3,
            HistoryRange::ThreeYears => 9,
            HistoryRange::FiveYears => 15,
        }
    }

    /// Parse an optional range literal, defaulting to five years.
    pub fn parse_or_default(range: Option<&str>) -> Result<Self, EngineError> {
        range.map_or(Ok(HistoryRange::default()), str::parse::<HistoryRange>)
    }
}

impl FromStr for HistoryRange {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1yr" => Ok(HistoryRange::OneYear),
            "3yr" => Ok(HistoryRange::ThreeYears),
            "5yr" => Ok(HistoryRange::FiveYears),
            other => Err(EngineError::InvalidRange(other.to_string())),
        }
    }
}

#[derive(Default)]
struct Totals {
    enrolled: u64,
    capacity: u64,
}

/// Lecture sections are an uppercase letter followed by digits (`D100`,
/// `E100`). Lab and tutorial sections such as `D1L1` or `D1T1` share seats
/// with their lecture and are left out of the totals.
pub fn is_lecture_section(section: &str) -> bool {
    // ---
    let mut chars = section.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_digit())
}

/// Sum enrollment and capacity of lecture sections per semester.
///
/// Non-lecture sections are ignored, as are rows where either figure is not
/// numeric. Semesters whose summed
/// capacity is zero are dropped. At most `max_semesters` of the most recent
/// semesters are kept; the result is in ascending semester order.
pub fn reduce(rows: &[SectionRecord], max_semesters: usize) -> Vec<GraphDataPoint> {
    // ---
    let mut per_semester: BTreeMap<SemesterCode, Totals> = BTreeMap::new();

    for row in rows.iter().filter(|row| is_lecture_section(&row.section)) {
        let totals = per_semester.entry(row.semester_code).or_default();
        match (row.enrolled.value(), row.capacity.value()) {
            (Some(enrolled), Some(capacity)) => {
                totals.enrolled += u64::from(enrolled);
                totals.capacity += u64::from(capacity);
            }
            _ => tracing::debug!(
                "Skipping section {} in {}: enrolled '{}', capacity '{}'",
                row.section,
                row.semester_code,
                row.enrolled.raw(),
                row.capacity.raw()
            ),
        }
    }

    let mut points: Vec<GraphDataPoint> = per_semester
        .into_iter()
        .rev()
        .take(max_semesters)
        .filter(|(_, totals)| totals.capacity > 0)
        .map(|(code, totals)| GraphDataPoint {
            semester_code: code,
            term: code.term(),
            year: code.year(),
            total_enrolled: totals.enrolled,
            total_capacity: totals.capacity,
            load_percent: round_one_decimal(totals.enrolled as f64 * 100.0 / totals.capacity as f64),
        })
        .collect();

    points.reverse();
    points
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::Count;

    fn row(code: i64, section: &str, enrolled: &str, capacity: &str) -> SectionRecord {
        // ---
        SectionRecord {
            section: section.to_string(),
            info_url: String::new(),
            semester_code: SemesterCode::new(code).unwrap(),
            location: Some("Burnaby".to_string()),
            instructors: String::new(),
            enrolled: Count::parse(enrolled),
            capacity: Count::parse(capacity),
        }
    }

    fn codes(points: &[GraphDataPoint]) -> Vec<u16> {
        points.iter().map(|p| p.semester_code.get()).collect()
    }

    #[test]
    fn test_range_literals() {
        // ---
        assert_eq!("1yr".parse::<HistoryRange>().unwrap().max_semesters(), 3);
        assert_eq!("3yr".parse::<HistoryRange>().unwrap().max_semesters(), 9);
        assert_eq!("5yr".parse::<HistoryRange>().unwrap().max_semesters(), 15);
        assert_eq!(
            HistoryRange::parse_or_default(None).unwrap(),
            HistoryRange::FiveYears
        );

        for bogus in ["bogus", "2yr", "5YR", ""] {
            assert!(matches!(
                bogus.parse::<HistoryRange>(),
                Err(EngineError::InvalidRange(_))
            ));
        }
    }

    #[test]
    fn test_sums_sections_per_semester() {
        // ---
        let rows = vec![
            row(1257, "D100", "96", "100"),
            row(1257, "E100", "50", "100"),
            row(1254, "D100", "40", "60"),
        ];

        let points = reduce(&rows, 9);

        assert_eq!(codes(&points), vec![1254, 1257]);
        assert_eq!(points[1].total_enrolled, 146);
        assert_eq!(points[1].total_capacity, 200);
        assert_eq!(points[1].load_percent, 73.0);
        // 40/60 = 66.666..
        assert_eq!(points[0].load_percent, 66.7);
        assert_eq!(points[0].year, 2025);
    }

    #[test]
    fn test_skips_placeholder_rows() {
        // ---
        let rows = vec![
            row(1257, "D100", "96", "100"),
            row(1257, "D200", "TBA", "100"),
            row(1261, "D100", "TBA", "TBA"),
        ];

        let points = reduce(&rows, 9);

        assert_eq!(codes(&points), vec![1257]);
        assert_eq!(points[0].total_capacity, 100);
        assert_eq!(points[0].load_percent, 96.0);
    }

    #[test]
    fn test_only_lecture_sections_count() {
        // ---
        let rows = vec![
            row(1257, "D100", "96", "100"),
            row(1257, "D1L1", "20", "24"),
            row(1257, "LAB", "20", "24"),
            row(1257, "d200", "5", "10"),
            row(1254, "D1T1", "10", "12"),
        ];

        let points = reduce(&rows, 9);

        assert_eq!(codes(&points), vec![1257]);
        assert_eq!(points[0].total_enrolled, 96);
        assert_eq!(points[0].total_capacity, 100);

        assert!(is_lecture_section("E100"));
        assert!(!is_lecture_section("D"));
        assert!(!is_lecture_section(""));
    }

    #[test]
    fn test_zero_capacity_semester_is_omitted() {
        // ---
        let rows = vec![row(1251, "D100", "0", "0"), row(1254, "D100", "10", "20")];
        assert_eq!(codes(&reduce(&rows, 9)), vec![1254]);
    }

    #[test]
    fn test_keeps_most_recent_semesters_ascending() {
        // ---
        let rows: Vec<SectionRecord> = SemesterCode::new(1257)
            .unwrap()
            .recent(12)
            .into_iter()
            .map(|code| row(i64::from(code.get()), "D100", "30", "40"))
            .collect();

        let points = reduce(&rows, 9);

        assert_eq!(points.len(), 9);
        assert!(points.windows(2).all(|w| w[0].semester_code < w[1].semester_code));
        assert_eq!(points.last().unwrap().semester_code.get(), 1257);
        assert_eq!(points[0].semester_code.get(), 1231);
    }
}
