//! Database schema management for `courseplanner-offerings`.
//!
//! Ensures the catalog and grade statistics tables exist before serving
//! requests. Applied once on startup from `main.rs` (EMBP: single gateway call).
//! Rows are loaded by a separate import job; this service only reads them.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates `departments` and `courses` for the catalog and `grade_stats` for
/// historical grade statistics. Safe to call on every startup; no-op if
/// objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            dept_id   BIGINT PRIMARY KEY,
            dept_code TEXT   NOT NULL UNIQUE,
            name      TEXT   NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS courses (
            course_id     BIGINT  PRIMARY KEY,
            dept_id       BIGINT  NOT NULL REFERENCES departments (dept_id),
            course_number TEXT    NOT NULL,
            title         TEXT,
            description   TEXT,
            units         INTEGER,
            degree_level  TEXT,
            prerequisites TEXT,
            corequisites  TEXT,
            designation   TEXT
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // One row per course; not semester specific
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS grade_stats (
            course_id          BIGINT PRIMARY KEY REFERENCES courses (course_id),
            median_grade       TEXT,
            fail_rate          DOUBLE PRECISION,
            grade_distribution JSONB
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_courses_dept_id
            ON courses (dept_id);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
