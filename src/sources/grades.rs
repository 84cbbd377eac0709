//! PostgreSQL-backed grade statistics source.
//!
//! Statistics are imported in bulk from a historical dataset and stored one
//! row per course. The distribution column holds the imported JSON document
//! as-is, which mixes letter-grade percentages with summary entries such as
//! `"Median Grade"`; only letter grades with numeric values are kept.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::GradeStatsSource;
use crate::error::SourceError;
use crate::models::{is_letter_grade, GradeStats};

// ---

#[derive(Debug, Clone)]
pub struct PgGradeStats {
    pool: PgPool,
}

impl PgGradeStats {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GradeStatsSource for PgGradeStats {
    // ---
    async fn grade_stats(&self, course_id: i64) -> Result<Option<GradeStats>, SourceError> {
        // ---
        let row: Option<(Option<String>, Option<f64>, Option<Value>)> = sqlx::query_as(
            r#"
            SELECT median_grade, fail_rate, grade_distribution
            FROM grade_stats
            WHERE course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(median_grade, fail_rate, document)| GradeStats {
            median_grade,
            fail_rate,
            distribution: document
                .as_ref()
                .map(letter_grade_distribution)
                .unwrap_or_default(),
        }))
    }
}

/// Extract the letter-grade entries with numeric values from a stored document.
pub fn letter_grade_distribution(document: &Value) -> BTreeMap<String, f64> {
    // ---
    let Some(entries) = document.as_object() else {
        tracing::debug!("Grade distribution document is not an object: {}", document);
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter(|(grade, _)| is_letter_grade(grade))
        .filter_map(|(grade, value)| value.as_f64().map(|pct| (grade.clone(), pct)))
        .collect()
}
