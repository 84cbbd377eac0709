use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use super::AppState;
use crate::error::EngineError;
use crate::models::{Course, CourseOffering, Department, OfferingDetail};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/departments", get(list_departments))
        .route("/api/departments/{dept_id}/courses", get(list_courses))
        .route(
            "/api/departments/{dept_id}/courses/{course_id}/offerings",
            get(list_offerings),
        )
        .route(
            "/api/departments/{dept_id}/courses/{course_id}/offerings/{semester_code}",
            get(offering_detail),
        )
}

async fn list_departments(
    State(aggregator): State<AppState>,
) -> Result<Json<Vec<Department>>, EngineError> {
    // ---
    info!("GET /api/departments");
    Ok(Json(aggregator.list_departments().await?))
}

async fn list_courses(
    Path(dept_id): Path<i64>,
    State(aggregator): State<AppState>,
) -> Result<Json<Vec<Course>>, EngineError> {
    // ---
    info!("GET /api/departments/{}/courses", dept_id);
    Ok(Json(aggregator.list_courses(dept_id).await?))
}

async fn list_offerings(
    Path((dept_id, course_id)): Path<(i64, i64)>,
    State(aggregator): State<AppState>,
) -> Result<Json<Vec<CourseOffering>>, EngineError> {
    // ---
    info!("GET /api/departments/{}/courses/{}/offerings", dept_id, course_id);
    let offerings = aggregator.list_offerings(dept_id, course_id).await?;
    info!("Returning {} offerings", offerings.len());
    Ok(Json(offerings))
}

/// The semester segment is taken as text so that non-numeric or overflowing
/// codes get the same `INVALID_SEMESTER_CODE` body as out-of-range ones.
async fn offering_detail(
    Path((dept_id, course_id, semester_code)): Path<(i64, i64, String)>,
    State(aggregator): State<AppState>,
) -> Result<Json<OfferingDetail>, EngineError> {
    // ---
    info!(
        "GET /api/departments/{}/courses/{}/offerings/{}",
        dept_id, course_id, semester_code
    );
    let code: i64 = semester_code
        .parse()
        .map_err(|_| EngineError::InvalidSemesterCode(semester_code.clone()))?;

    let detail = aggregator
        .get_offering_detail(dept_id, course_id, code)
        .await?;
    Ok(Json(detail))
}
