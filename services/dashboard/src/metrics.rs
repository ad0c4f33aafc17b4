//! Application metrics collection and reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use serde::Serialize;

/// Which export was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Csv,
    SinglePdf,
    ComparisonPdf,
}

impl ExportKind {
    fn label(&self) -> &'static str {
        match self {
            ExportKind::Csv => "csv",
            ExportKind::SinglePdf => "single_pdf",
            ExportKind::ComparisonPdf => "comparison_pdf",
        }
    }
}

/// Metrics collector for the dashboard.
///
/// Every event is counted locally (for the health endpoint) and forwarded to
/// the `metrics` recorder (for Prometheus).
#[derive(Debug)]
pub struct MetricsCollector {
    pub uploads_accepted: AtomicU64,
    pub uploads_rejected: AtomicU64,
    pub upload_bytes: AtomicU64,
    pub extractions_succeeded: AtomicU64,
    pub extractions_failed: AtomicU64,
    pub exports: AtomicU64,
    pub export_errors: AtomicU64,

    /// Extraction timing, microseconds.
    extraction_us_total: AtomicU64,
    extraction_us_max: AtomicU64,

    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            uploads_accepted: AtomicU64::new(0),
            uploads_rejected: AtomicU64::new(0),
            upload_bytes: AtomicU64::new(0),
            extractions_succeeded: AtomicU64::new(0),
            extractions_failed: AtomicU64::new(0),
            exports: AtomicU64::new(0),
            export_errors: AtomicU64::new(0),
            extraction_us_total: AtomicU64::new(0),
            extraction_us_max: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_upload(&self, bytes: usize) {
        self.uploads_accepted.fetch_add(1, Ordering::Relaxed);
        self.upload_bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        counter!("dfos_uploads_total", "outcome" => "accepted").increment(1);
        counter!("dfos_upload_bytes_total").increment(bytes as u64);
    }

    pub fn record_rejected_upload(&self) {
        self.uploads_rejected.fetch_add(1, Ordering::Relaxed);
        counter!("dfos_uploads_total", "outcome" => "rejected").increment(1);
    }

    /// Record one extraction and how long it took.
    pub fn record_extraction(&self, success: bool, elapsed: Duration) {
        if success {
            self.extractions_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.extractions_failed.fetch_add(1, Ordering::Relaxed);
        }
        let outcome = if success { "success" } else { "failure" };
        counter!("dfos_extractions_total", "outcome" => outcome).increment(1);
        histogram!("dfos_extraction_duration_seconds").record(elapsed.as_secs_f64());

        let us = elapsed.as_micros() as u64;
        self.extraction_us_total.fetch_add(us, Ordering::Relaxed);
        self.extraction_us_max.fetch_max(us, Ordering::Relaxed);
    }

    pub fn record_export(&self, kind: ExportKind) {
        self.exports.fetch_add(1, Ordering::Relaxed);
        counter!("dfos_exports_total", "kind" => kind.label()).increment(1);
    }

    pub fn record_export_error(&self, kind: ExportKind) {
        self.export_errors.fetch_add(1, Ordering::Relaxed);
        counter!("dfos_export_errors_total", "kind" => kind.label()).increment(1);
    }

    /// Publish session sizes as gauges.
    pub fn record_session_size(&self, pending: usize, processed: usize) {
        gauge!("dfos_pending_uploads").set(pending as f64);
        gauge!("dfos_processed_files").set(processed as f64);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let succeeded = self.extractions_succeeded.load(Ordering::Relaxed);
        let failed = self.extractions_failed.load(Ordering::Relaxed);
        let total = succeeded + failed;
        let total_us = self.extraction_us_total.load(Ordering::Relaxed);

        MetricsSnapshot {
            uptime_secs: self.uptime().as_secs(),
            uploads_accepted: self.uploads_accepted.load(Ordering::Relaxed),
            uploads_rejected: self.uploads_rejected.load(Ordering::Relaxed),
            upload_bytes: self.upload_bytes.load(Ordering::Relaxed),
            extractions_succeeded: succeeded,
            extractions_failed: failed,
            extraction_avg_ms: if total == 0 {
                0.0
            } else {
                total_us as f64 / total as f64 / 1000.0
            },
            extraction_max_ms: self.extraction_us_max.load(Ordering::Relaxed) as f64 / 1000.0,
            exports: self.exports.load(Ordering::Relaxed),
            export_errors: self.export_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub uploads_accepted: u64,
    pub uploads_rejected: u64,
    pub upload_bytes: u64,
    pub extractions_succeeded: u64,
    pub extractions_failed: u64,
    pub extraction_avg_ms: f64,
    pub extraction_max_ms: f64,
    pub exports: u64,
    pub export_errors: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_timing() {
        let metrics = MetricsCollector::new();
        metrics.record_extraction(true, Duration::from_millis(4));
        metrics.record_extraction(false, Duration::from_millis(2));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.extractions_succeeded, 1);
        assert_eq!(snapshot.extractions_failed, 1);
        assert!((snapshot.extraction_avg_ms - 3.0).abs() < 1e-9);
        assert!((snapshot.extraction_max_ms - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_upload_counters() {
        let metrics = MetricsCollector::new();
        metrics.record_upload(100);
        metrics.record_upload(50);
        metrics.record_rejected_upload();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.uploads_accepted, 2);
        assert_eq!(snapshot.upload_bytes, 150);
        assert_eq!(snapshot.uploads_rejected, 1);
    }
}
