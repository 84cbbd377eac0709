//! PostgreSQL-backed catalog repository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::CatalogRepository;
use crate::error::SourceError;
use crate::models::{Course, Department};

const COURSE_COLUMNS: &str = r#"
    course_id, dept_id, course_number, title, description, units,
    degree_level, prerequisites, corequisites, designation
"#;

// ---

#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalog {
    // ---
    async fn departments(&self) -> Result<Vec<Department>, SourceError> {
        // ---
        let rows = sqlx::query_as::<_, Department>(
            "SELECT dept_id, dept_code, name FROM departments ORDER BY dept_code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn department(&self, dept_id: i64) -> Result<Option<Department>, SourceError> {
        // ---
        let row = sqlx::query_as::<_, Department>(
            "SELECT dept_id, dept_code, name FROM departments WHERE dept_id = $1",
        )
        .bind(dept_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn courses(&self, dept_id: i64) -> Result<Vec<Course>, SourceError> {
        // ---
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE dept_id = $1 ORDER BY course_number"
        );
        let rows = sqlx::query_as::<_, Course>(&sql)
            .bind(dept_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn course(&self, course_id: i64) -> Result<Option<Course>, SourceError> {
        // ---
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE course_id = $1");
        let row = sqlx::query_as::<_, Course>(&sql)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}
