//! Form-post handlers. Each one runs a single session interaction and
//! redirects back to the dashboard.

use std::sync::Arc;

use axum::{
    extract::{Extension, Multipart, Path},
    response::Redirect,
    Form,
};
use dfos_common::DfosError;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::common::{back_to_dashboard, parse_channel, parse_index, parse_offset, HandlerResult};
use crate::state::AppState;

/// Multipart field carrying uploaded files.
pub const UPLOAD_FIELD: &str = "files";

#[derive(Debug, Deserialize)]
pub struct ControlsForm {
    pub channel: String,
    pub offset: Option<String>,
    pub x_min: Option<String>,
    pub x_max: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OverlayForm {
    pub channel: String,
    pub x_min: Option<String>,
    pub x_max: Option<String>,
}

/// POST /upload
///
/// Every valid file is queued even when another file in the same request is
/// rejected; the first rejection is then returned.
pub async fn upload_handler(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> HandlerResult<Redirect> {
    let mut first_error: Option<DfosError> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DfosError::invalid(UPLOAD_FIELD, e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // Browsers send an empty part when no file was chosen.
        let Some(file_name) = field.file_name().map(str::to_string).filter(|n| !n.is_empty())
        else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| DfosError::invalid(UPLOAD_FIELD, e.body_text()))?;
        let size = data.len();

        let mut session = state.session.lock().await;
        match session.add_upload(&file_name, data) {
            Ok(_) => state.metrics.record_upload(size),
            Err(err) => {
                warn!(file = %file_name, error = %err, "Upload rejected");
                state.metrics.record_rejected_upload();
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err.into()),
        None => Ok(back_to_dashboard()),
    }
}

/// POST /process/:name
#[instrument(skip(state))]
pub async fn process_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> HandlerResult<Redirect> {
    let mut session = state.session.lock().await;
    state.process_pending(&mut session, &name).await?;
    Ok(back_to_dashboard())
}

/// POST /process-all
pub async fn process_all_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> HandlerResult<Redirect> {
    let mut session = state.session.lock().await;
    state.process_all_pending(&mut session).await;
    Ok(back_to_dashboard())
}

/// POST /files/:name/controls
pub async fn controls_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
    Form(form): Form<ControlsForm>,
) -> HandlerResult<Redirect> {
    let channel = parse_channel(&form.channel)?;
    let offset = parse_offset(form.offset.as_deref())?;
    let x_min = parse_index("x_min", form.x_min.as_deref())?;
    let x_max = parse_index("x_max", form.x_max.as_deref())?;

    let mut session = state.session.lock().await;
    let controls = session.set_controls(&name, channel, offset, x_min, x_max)?;
    info!(file = %name, %channel, offset = controls.offset, range = ?controls.range, "Controls updated");
    Ok(back_to_dashboard())
}

/// POST /overlay/controls
pub async fn overlay_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<OverlayForm>,
) -> HandlerResult<Redirect> {
    let channel = parse_channel(&form.channel)?;
    let x_min = parse_index("x_min", form.x_min.as_deref())?;
    let x_max = parse_index("x_max", form.x_max.as_deref())?;

    let mut session = state.session.lock().await;
    let range = session.set_overlay_range(channel, x_min, x_max)?;
    info!(%channel, range = ?range, "Overlay range updated");
    Ok(back_to_dashboard())
}

/// POST /files/:name/remove
pub async fn remove_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> HandlerResult<Redirect> {
    let mut session = state.session.lock().await;
    session.remove(&name)?;
    state
        .metrics
        .record_session_size(session.pending().len(), session.result_count());
    Ok(back_to_dashboard())
}

/// POST /clear
pub async fn clear_handler(Extension(state): Extension<Arc<AppState>>) -> Redirect {
    let mut session = state.session.lock().await;
    session.clear();
    state.metrics.record_session_size(0, 0);
    back_to_dashboard()
}

/// POST /history/clear
pub async fn clear_history_handler(Extension(state): Extension<Arc<AppState>>) -> Redirect {
    state.session.lock().await.clear_history();
    info!("History cleared");
    back_to_dashboard()
}
