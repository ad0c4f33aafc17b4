//! CSV and PDF downloads of the current views.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    response::Response,
};
use chrono::Local;
use dfos_common::{DfosError, DfosResult};
use report::export_file_name;
use serde::Deserialize;
use tracing::info;

use super::common::{attachment, HandlerResult};
use crate::metrics::ExportKind;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompareParams {
    pub first: Option<String>,
    pub second: Option<String>,
}

/// GET /files/:name/export.csv
pub async fn csv_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> HandlerResult<Response> {
    let body = {
        let session = state.session.lock().await;
        track(&state, ExportKind::Csv, session.csv(&name))?
    };
    let file_name = export_file_name("DFOS_Data", "csv", Local::now().naive_local());
    info!(file = %name, download = %file_name, bytes = body.len(), "CSV exported");
    Ok(attachment("text/csv; charset=utf-8", &file_name, body))
}

/// GET /files/:name/report.pdf
pub async fn report_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> HandlerResult<Response> {
    let now = Local::now().naive_local();
    let body = {
        let session = state.session.lock().await;
        track(&state, ExportKind::SinglePdf, session.single_report(&name, now))?
    };
    let file_name = export_file_name("DFOS_Report", "pdf", now);
    info!(file = %name, download = %file_name, bytes = body.len(), "Report exported");
    Ok(attachment("application/pdf", &file_name, body))
}

/// GET /compare/report.pdf?first=&second=
pub async fn compare_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<CompareParams>,
) -> HandlerResult<Response> {
    let first = required(params.first, "first")?;
    let second = required(params.second, "second")?;

    let now = Local::now().naive_local();
    let body = {
        let session = state.session.lock().await;
        track(
            &state,
            ExportKind::ComparisonPdf,
            session.comparison_report(&first, &second, now),
        )?
    };
    let file_name = export_file_name("DFOS_Comparison", "pdf", now);
    info!(%first, %second, download = %file_name, bytes = body.len(), "Comparison exported");
    Ok(attachment("application/pdf", &file_name, body))
}

fn required(value: Option<String>, param: &str) -> DfosResult<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| DfosError::MissingParameter(param.to_string()))
}

fn track(state: &AppState, kind: ExportKind, result: DfosResult<Vec<u8>>) -> DfosResult<Vec<u8>> {
    match &result {
        Ok(_) => state.metrics.record_export(kind),
        Err(_) => state.metrics.record_export_error(kind),
    }
    result
}
