//! HTTP request handlers.
//!
//! - `pages`: the dashboard and history HTML pages
//! - `actions`: form posts (upload, process, controls, remove, clear)
//! - `export`: CSV and PDF downloads
//! - `api`: JSON views of the session
//! - `health`: health check and Prometheus metrics
//! - `common`: error responses and form helpers

pub mod actions;
pub mod api;
pub mod common;
pub mod export;
pub mod health;
pub mod pages;

pub use common::{AppError, HandlerResult};
