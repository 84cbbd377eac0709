//! Route gateway (EMBP): each sibling module exports a subrouter, merged here
//! so `main.rs` does not need to know about individual endpoints.

use std::sync::Arc;

use axum::Router;

use crate::OfferingAggregator;

mod about;
mod browse;
mod error;
mod graph;
mod health;

/// State shared by every handler.
pub type AppState = Arc<OfferingAggregator>;

// ---

pub fn router(aggregator: AppState) -> Router {
    // ---
    Router::new()
        .merge(about::router())
        .merge(browse::router())
        .merge(graph::router())
        .merge(health::router())
        .with_state(aggregator)
}
