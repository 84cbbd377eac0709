//! HTTP client for the CourSys course browser.
//!
//! The browse endpoint answers `tabledata=yes` queries with one JSON row per
//! section:
//!
//! ```text
//! [term, "<a href=\"/browse/info/...\">CMPT 276 D100</a>", title, "96/100", instructors, campus]
//! ```
//!
//! One request covers one course in one semester, so multi-semester windows
//! are fetched with bounded concurrency. Each request carries its own
//! timeout.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;

use super::EnrollmentSource;
use crate::error::SourceError;
use crate::models::{Count, CourseKey, SectionRecord};
use crate::semester::SemesterCode;

const LINK_COLUMN: usize = 1;
const ENROLLMENT_COLUMN: usize = 3;
const INSTRUCTOR_COLUMN: usize = 4;
const CAMPUS_COLUMN: usize = 5;

// ---

#[derive(Debug, Clone)]
pub struct CourSysClient {
    client: reqwest::Client,
    base_url: String,
    concurrency: usize,
}

impl CourSysClient {
    // ---
    /// Build a client with a per-request `timeout`, issuing at most
    /// `concurrency` requests at a time for multi-semester windows.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        concurrency: usize,
    ) -> Result<Self, SourceError> {
        // ---
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            concurrency: concurrency.max(1),
        })
    }
}

#[derive(Debug, Deserialize)]
struct BrowseResponse {
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[async_trait]
impl EnrollmentSource for CourSysClient {
    // ---
    async fn sections(
        &self,
        course: &CourseKey,
        latest: SemesterCode,
        max_semesters: usize,
    ) -> Result<Vec<SectionRecord>, SourceError> {
        // ---
        let semesters = latest.recent(max_semesters);
        tracing::debug!(
            "Fetching {} {} across {} semesters ending {}",
            course.dept_code,
            course.course_number,
            semesters.len(),
            latest
        );

        // A semester CourSys refuses to serve counts as empty; transport
        // failures still fail the window
        let pages: Vec<Vec<SectionRecord>> = stream::iter(semesters)
            .map(|semester| async move {
                match self.semester_sections(course, semester).await {
                    Err(SourceError::Status { status, .. }) => {
                        tracing::warn!(
                            "CourSys returned {} for {} {} in {}, treating as no sections",
                            status,
                            course.dept_code,
                            course.course_number,
                            semester
                        );
                        Ok(Vec::new())
                    }
                    other => other,
                }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(pages.into_iter().flatten().collect())
    }

    async fn semester_sections(
        &self,
        course: &CourseKey,
        semester: SemesterCode,
    ) -> Result<Vec<SectionRecord>, SourceError> {
        // ---
        let query = [
            ("subject[]", course.dept_code.to_uppercase()),
            ("number[]", course.course_number.clone()),
            ("semester[]", semester.to_string()),
            ("tabledata", "yes".to_string()),
        ];

        let response = self.client.get(&self.base_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let page: BrowseResponse = response.json().await?;
        let sections = parse_rows(&page.data, semester);

        tracing::debug!(
            "{} {} in {}: {} of {} rows parsed",
            course.dept_code,
            course.course_number,
            semester,
            sections.len(),
            page.data.len()
        );
        Ok(sections)
    }
}

/// Parse browse rows, skipping any row that does not have the expected shape.
pub fn parse_rows(rows: &[Vec<Value>], semester: SemesterCode) -> Vec<SectionRecord> {
    // ---
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| match parse_row(row, semester) {
            Ok(section) => Some(section),
            Err(e) => {
                tracing::debug!("Skipping row {} for {}: {} - Raw row: {:?}", i, semester, e, row);
                None
            }
        })
        .collect()
}

fn parse_row(row: &[Value], semester: SemesterCode) -> Result<SectionRecord, SourceError> {
    // ---
    if row.len() <= CAMPUS_COLUMN {
        return Err(SourceError::Malformed(format!(
            "expected at least {} columns, got {}",
            CAMPUS_COLUMN + 1,
            row.len()
        )));
    }

    let text = |column: usize| row[column].as_str().unwrap_or_default().trim();

    let (section, info_url) = parse_link(text(LINK_COLUMN))
        .ok_or_else(|| SourceError::Malformed(format!("bad section link: {}", text(LINK_COLUMN))))?;

    let (enrolled, capacity) = match text(ENROLLMENT_COLUMN).split_once('/') {
        Some((enrolled, capacity)) => (Count::parse(enrolled.trim()), Count::parse(capacity.trim())),
        None => {
            let raw = text(ENROLLMENT_COLUMN).to_string();
            (Count::Unavailable(raw.clone()), Count::Unavailable(raw))
        }
    };

    let campus = text(CAMPUS_COLUMN);

    Ok(SectionRecord {
        section,
        info_url,
        semester_code: semester,
        location: (!campus.is_empty()).then(|| campus.to_string()),
        instructors: text(INSTRUCTOR_COLUMN).to_string(),
        enrolled,
        capacity,
    })
}

/// Split `<a href="/browse/info/...">CMPT 276 D100</a>` into the section
/// (last word of the link text) and the link target.
fn parse_link(html: &str) -> Option<(String, String)> {
    // ---
    let href_start = html.find("href=\"")? + "href=\"".len();
    let href_len = html[href_start..].find('"')?;
    let info_url = &html[href_start..href_start + href_len];

    let text_start = html.find('>')? + 1;
    let text_len = html[text_start..].find("</")?;
    let section = html[text_start..text_start + text_len]
        .split_whitespace()
        .last()?;

    Some((section.to_string(), info_url.to_string()))
}
