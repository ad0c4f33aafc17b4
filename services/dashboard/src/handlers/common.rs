//! Shared handler utilities: error responses, form parsing and HTML helpers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use dfos_common::{Channel, DfosError, DfosResult};
use tracing::warn;

// ============================================================================
// Errors
// ============================================================================

/// A [`DfosError`] rendered as a plain-text response.
#[derive(Debug)]
pub struct AppError(pub DfosError);

pub type HandlerResult<T> = Result<T, AppError>;

impl From<DfosError> for AppError {
    fn from(err: DfosError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(error = %self.0, "Request failed");
        }
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.0.to_string(),
        )
            .into_response()
    }
}

/// Every form post lands back on the dashboard.
pub fn back_to_dashboard() -> Redirect {
    Redirect::to("/")
}

// ============================================================================
// Form fields
// ============================================================================

pub fn parse_channel(value: &str) -> DfosResult<Channel> {
    value
        .parse::<Channel>()
        .map_err(|message| DfosError::invalid("channel", message))
}

/// Offset field. Blank means zero.
pub fn parse_offset(value: Option<&str>) -> DfosResult<f64> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(0.0),
        Some(v) => v
            .parse::<f64>()
            .map_err(|_| DfosError::invalid("offset", format!("'{}' is not a number", v))),
    }
}

/// Range bound field. Blank means unset.
pub fn parse_index(param: &str, value: Option<&str>) -> DfosResult<Option<usize>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse::<usize>().map(Some).map_err(|_| {
            DfosError::invalid(param, format!("'{}' is not a distance index", v))
        }),
    }
}

// ============================================================================
// Responses
// ============================================================================

/// A download with a `Content-Disposition` file name.
pub fn attachment(content_type: &'static str, file_name: &str, body: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset(None).unwrap(), 0.0);
        assert_eq!(parse_offset(Some("  ")).unwrap(), 0.0);
        assert_eq!(parse_offset(Some("-2.5")).unwrap(), -2.5);
        assert!(parse_offset(Some("abc")).is_err());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("x_min", Some("")).unwrap(), None);
        assert_eq!(parse_index("x_min", Some("12")).unwrap(), Some(12));
        let err = parse_index("x_max", Some("-1")).unwrap_err();
        assert!(err.to_string().contains("x_max"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn test_error_status() {
        let response = AppError(DfosError::FileNotFound("a.h5".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
