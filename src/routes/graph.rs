//! Chart data: historical grade distribution and enrollment trends.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::error::EngineError;
use crate::history::HistoryRange;
use crate::models::{GradeDistribution, GraphDataPoint};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/graph/grade-distribution", get(grade_distribution))
        .route("/api/graph/enrollment-history", get(enrollment_history))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeDistributionQuery {
    course_id: i64,
}

/// Query parameters for the enrollment history chart
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentHistoryQuery {
    dept_id: i64,
    course_id: i64,
    /// "1yr", "3yr" or "5yr"; defaults to "5yr"
    range: Option<String>,
}

async fn grade_distribution(
    Query(params): Query<GradeDistributionQuery>,
    State(aggregator): State<AppState>,
) -> Result<Json<GradeDistribution>, EngineError> {
    // ---
    info!("GET /api/graph/grade-distribution - {:?}", params);
    Ok(Json(aggregator.grade_distribution(params.course_id).await?))
}

async fn enrollment_history(
    Query(params): Query<EnrollmentHistoryQuery>,
    State(aggregator): State<AppState>,
) -> Result<Json<Vec<GraphDataPoint>>, EngineError> {
    // ---
    info!("GET /api/graph/enrollment-history - {:?}", params);
    let range = HistoryRange::parse_or_default(params.range.as_deref())?;

    let points = aggregator
        .enrollment_history(params.dept_id, params.course_id, range)
        .await?;
    info!("Returning {} data points", points.len());
    Ok(Json(points))
}
