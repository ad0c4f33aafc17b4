//! JSON API over the session.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use bts_parser::{AnalysisResult, ShapeMetadata};
use dfos_common::{Channel, SchemaVariant};
use serde::Serialize;

use super::common::HandlerResult;
use crate::session::{BatchReport, FileSummary, HistoryEntry, PendingUpload};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub pending: Vec<PendingUpload>,
    pub processed: Vec<FileSummary>,
    pub last_batch: Option<BatchReport>,
}

/// One channel of a processed file with the file's current controls applied.
#[derive(Debug, Serialize)]
pub struct ChannelView {
    pub channel: Channel,
    pub unit: &'static str,
    pub offset: f64,
    pub x_min: usize,
    pub x_max: usize,
    pub distance: Vec<usize>,
    pub values: Vec<f64>,
}

/// JSON shape of an [`AnalysisResult`].
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResultView {
    Success {
        name: String,
        file_type: SchemaVariant,
        distance_points: usize,
        time: Vec<f64>,
        metadata: ShapeMetadata,
        channels: Vec<ChannelView>,
    },
    Failure {
        name: String,
        kind: &'static str,
        error: String,
    },
}

/// GET /api/files
pub async fn files_handler(Extension(state): Extension<Arc<AppState>>) -> Json<FilesResponse> {
    let session = state.session.lock().await;
    Json(FilesResponse {
        pending: session.pending(),
        processed: session.summaries(),
        last_batch: session.last_batch().cloned(),
    })
}

/// GET /api/files/:name
pub async fn file_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> HandlerResult<Json<ResultView>> {
    let session = state.session.lock().await;
    let view = match session.result(&name)? {
        AnalysisResult::Success(extraction) => {
            let channels = extraction
                .display_channels()
                .into_iter()
                .map(|channel| {
                    let series = session.channel_series(&name, channel)?;
                    Ok(ChannelView {
                        channel,
                        unit: channel.unit(),
                        offset: series.offset,
                        x_min: series.range.min,
                        x_max: series.range.max,
                        distance: series.distance,
                        values: series.values,
                    })
                })
                .collect::<Result<Vec<_>, dfos_common::DfosError>>()?;
            ResultView::Success {
                name: name.clone(),
                file_type: extraction.file_type,
                distance_points: extraction.distance_points,
                time: extraction.time.clone(),
                metadata: extraction.metadata.clone(),
                channels,
            }
        }
        AnalysisResult::Failure(err) => ResultView::Failure {
            name: name.clone(),
            kind: err.kind(),
            error: err.to_string(),
        },
    };
    Ok(Json(view))
}

/// GET /api/history
pub async fn history_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    let session = state.session.lock().await;
    Json(session.history().cloned().collect())
}
