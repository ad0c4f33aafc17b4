//! DFOS monitoring dashboard.
//!
//! A single-session web service: upload BTS acquisitions, extract them,
//! inspect each channel with offset and range controls, overlay files, and
//! export CSV or PDF reports.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use handlers::{actions, api, export, health, pages};

pub use config::DashboardConfig;
pub use session::Session;
pub use state::AppState;

/// Build the dashboard router.
pub fn app(state: Arc<AppState>, prometheus: Option<PrometheusHandle>) -> Router {
    let body_limit = state.config.request_body_limit();

    let router = Router::new()
        // Pages
        .route("/", get(pages::dashboard_handler))
        .route("/history", get(pages::history_handler))
        // Session interactions
        .route("/upload", post(actions::upload_handler))
        .route("/process/:name", post(actions::process_handler))
        .route("/process-all", post(actions::process_all_handler))
        .route("/files/:name/controls", post(actions::controls_handler))
        .route("/files/:name/remove", post(actions::remove_handler))
        .route("/overlay/controls", post(actions::overlay_handler))
        .route("/clear", post(actions::clear_handler))
        .route("/history/clear", post(actions::clear_history_handler))
        // Exports
        .route("/files/:name/export.csv", get(export::csv_handler))
        .route("/files/:name/report.pdf", get(export::report_handler))
        .route("/compare/report.pdf", get(export::compare_handler))
        // JSON API
        .route("/api/files", get(api::files_handler))
        .route("/api/files/:name", get(api::file_handler))
        .route("/api/history", get(api::history_handler))
        // Health and metrics
        .route("/health", get(health::health_handler))
        .route("/metrics", get(health::metrics_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(state));

    let router = match prometheus {
        Some(handle) => router.layer(Extension(handle)),
        None => router,
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
