//! Route table

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the complete router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/report", get(handlers::report::api_report_handler));

    Router::new()
        .route("/", get(handlers::report::index_handler))
        .route("/report/run", get(handlers::report::run_report_handler))
        .route("/report/export.csv", get(handlers::report::export_csv_handler))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
