//! Application state and shared resources.

use std::sync::Arc;
use std::time::Instant;

use bts_parser::{default_opener, extract_bytes, ContainerOpener};
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::DashboardConfig;
use crate::metrics::MetricsCollector;
use crate::session::{BatchReport, FileOutcome, Session};
use dfos_common::{DfosError, DfosResult};

/// Shared application state.
pub struct AppState {
    /// The single dashboard session. Handlers hold the lock for their whole
    /// interaction.
    pub session: Mutex<Session>,
    pub opener: Arc<dyn ContainerOpener>,
    pub config: DashboardConfig,
    pub metrics: Arc<MetricsCollector>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let opener: Arc<dyn ContainerOpener> = Arc::from(default_opener(config.temp_dir.clone()));
        Self::with_opener(config, opener)
    }

    /// State with a specific container opener.
    pub fn with_opener(config: DashboardConfig, opener: Arc<dyn ContainerOpener>) -> Self {
        Self {
            session: Mutex::new(Session::new(&config)),
            opener,
            config,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// Extract one pending upload on the blocking pool and record the result.
    pub async fn process_pending(&self, session: &mut Session, name: &str) -> DfosResult<FileOutcome> {
        let data = session.pending_bytes(name)?;
        let opener = Arc::clone(&self.opener);

        let started = Instant::now();
        let result = tokio::task::spawn_blocking(move || extract_bytes(opener.as_ref(), &data))
            .await
            .map_err(|e| {
                error!(file = %name, error = %e, "Extraction task failed");
                DfosError::InternalError(format!("extraction task failed: {}", e))
            })?;
        let elapsed = started.elapsed();

        self.metrics.record_extraction(result.is_success(), elapsed);
        let outcome = session.record(name, result, elapsed);
        self.metrics
            .record_session_size(session.pending().len(), session.result_count());
        Ok(outcome)
    }

    /// Extract every pending upload in name order. A failing file is recorded
    /// in the report and the run continues.
    pub async fn process_all_pending(&self, session: &mut Session) -> BatchReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let names = session.pending_names();
        let total = names.len();
        info!(%run_id, total, "Processing all pending uploads");

        let mut outcomes = Vec::with_capacity(total);
        for (index, name) in names.iter().enumerate() {
            info!(%run_id, file = %name, index = index + 1, total, "Processing upload");
            let outcome = match self.process_pending(session, name).await {
                Ok(outcome) => outcome,
                Err(err) => FileOutcome {
                    file: name.clone(),
                    success: false,
                    file_type: None,
                    message: Some(err.to_string()),
                },
            };
            outcomes.push(outcome);
        }

        session.finish_batch(BatchReport::new(run_id, started_at, outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use dfos_common::Channel;
    use test_utils::fixtures::{brill_frequency, small_temp_strain, FixtureOpener};

    #[test]
    fn test_process_pending_records_result() {
        let state = AppState::with_opener(DashboardConfig::default(), Arc::new(FixtureOpener));

        let outcome = tokio_test::block_on(async {
            let mut session = state.session.lock().await;
            session
                .add_upload("run.h5", Bytes::from(small_temp_strain().to_bytes()))
                .unwrap();
            state.process_pending(&mut session, "run.h5").await
        });
        let outcome = outcome.unwrap();
        assert!(outcome.success);

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.extractions_succeeded, 1);
        assert_eq!(snapshot.extractions_failed, 0);
    }

    #[test]
    fn test_process_unknown_pending_file() {
        let state = AppState::with_opener(DashboardConfig::default(), Arc::new(FixtureOpener));
        let err = tokio_test::block_on(async {
            let mut session = state.session.lock().await;
            state.process_pending(&mut session, "missing.h5").await
        })
        .unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_process_all_isolates_failures() {
        let state = AppState::with_opener(DashboardConfig::default(), Arc::new(FixtureOpener));

        tokio_test::block_on(async {
            let mut session = state.session.lock().await;
            session
                .add_upload("a.h5", Bytes::from(small_temp_strain().to_bytes()))
                .unwrap();
            session.add_upload("b.bts", Bytes::from_static(b"garbage")).unwrap();
            session
                .add_upload("c.h5", Bytes::from(brill_frequency(2, 8).to_bytes()))
                .unwrap();

            let report = state.process_all_pending(&mut session).await;
            assert_eq!(report.succeeded, 2);
            assert_eq!(report.failed, 1);
            let files: Vec<_> = report.outcomes.iter().map(|o| o.file.as_str()).collect();
            assert_eq!(files, vec!["a.h5", "b.bts", "c.h5"]);
            assert!(!report.outcomes[1].success);
            assert!(report.outcomes[1].message.is_some());

            assert!(session.pending().is_empty());
            assert_eq!(session.result_count(), 3);
            assert_eq!(session.processed_names(), vec!["a.h5", "c.h5"]);
            assert_eq!(session.last_batch().map(|b| b.run_id), Some(report.run_id));

            let err = session.channel_series("b.bts", Channel::Strain).unwrap_err();
            assert_eq!(err.http_status_code(), 409);
        });

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.extractions_succeeded, 2);
        assert_eq!(snapshot.extractions_failed, 1);
    }

    #[test]
    fn test_process_all_with_nothing_pending() {
        let state = AppState::with_opener(DashboardConfig::default(), Arc::new(FixtureOpener));
        let report = tokio_test::block_on(async {
            let mut session = state.session.lock().await;
            state.process_all_pending(&mut session).await
        });
        assert!(report.outcomes.is_empty());
        assert_eq!(report.succeeded + report.failed, 0);
    }
}
