//! Health and Prometheus endpoints.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub pending_files: usize,
    pub processed_files: usize,
    pub metrics: MetricsSnapshot,
}

/// GET /health
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> Json<HealthResponse> {
    let (pending_files, processed_files) = {
        let session = state.session.lock().await;
        (session.pending().len(), session.result_count())
    };
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.metrics.uptime().as_secs(),
        pending_files,
        processed_files,
        metrics: state.metrics.snapshot(),
    })
}

/// GET /metrics
///
/// Prometheus text format. Empty when no recorder is installed.
pub async fn metrics_handler(handle: Option<Extension<PrometheusHandle>>) -> Response {
    let body = handle.map(|Extension(h)| h.render()).unwrap_or_default();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}
