use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::AppState;
use crate::models::AboutInfo;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/about", get(about))
}

async fn about(State(aggregator): State<AppState>) -> Json<AboutInfo> {
    // ---
    info!("GET /api/about");
    Json(aggregator.about())
}
