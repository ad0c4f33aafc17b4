//! The single in-memory dashboard session.
//!
//! Holds pending uploads, processed results, per-file per-channel view
//! controls, overlay ranges and the processing history. Every dashboard
//! interaction is one method here; the HTTP layer only parses requests and
//! renders what these methods return.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use bts_parser::{is_supported_file_name, AnalysisResult, Extraction};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use dfos_common::{
    Channel, ChannelControls, ChannelSeries, DfosError, DfosResult, SchemaVariant, XRange,
};
use report::ReportFile;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DashboardConfig;

/// One line of the processing history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub file: String,
    pub processed_at: DateTime<Utc>,
    pub success: bool,
    pub file_type: Option<SchemaVariant>,
    /// Error text for failures.
    pub message: Option<String>,
    pub duration_ms: f64,
}

/// Result of processing one upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub success: bool,
    pub file_type: Option<SchemaVariant>,
    pub message: Option<String>,
}

/// Summary of a "process all" run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<FileOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>, outcomes: Vec<FileOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        Self {
            run_id,
            started_at,
            failed: outcomes.len() - succeeded,
            succeeded,
            outcomes,
        }
    }
}

/// Short description of a processed file for listings and the JSON API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub success: bool,
    pub file_type: Option<SchemaVariant>,
    pub distance_points: Option<usize>,
    pub time_samples: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingUpload {
    pub name: String,
    pub size: usize,
}

#[derive(Debug)]
pub struct Session {
    max_upload_bytes: usize,
    history_limit: usize,
    pending: BTreeMap<String, Bytes>,
    results: BTreeMap<String, AnalysisResult>,
    controls: HashMap<(String, Channel), ChannelControls>,
    overlay_ranges: HashMap<Channel, XRange>,
    history: VecDeque<HistoryEntry>,
    last_batch: Option<BatchReport>,
}

impl Session {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            history_limit: config.history_limit,
            pending: BTreeMap::new(),
            results: BTreeMap::new(),
            controls: HashMap::new(),
            overlay_ranges: HashMap::new(),
            history: VecDeque::new(),
            last_batch: None,
        }
    }

    // ========================================================================
    // Uploads and processing
    // ========================================================================

    /// Queue an upload. Returns the stored name (any directory part removed).
    pub fn add_upload(&mut self, name: &str, data: Bytes) -> DfosResult<String> {
        let name = base_name(name);
        if !is_supported_file_name(&name) {
            return Err(DfosError::UnsupportedUpload(name));
        }
        if data.len() > self.max_upload_bytes {
            return Err(DfosError::UploadTooLarge {
                name,
                size: data.len(),
                limit: self.max_upload_bytes,
            });
        }
        info!(file = %name, bytes = data.len(), "Upload queued");
        self.pending.insert(name.clone(), data);
        Ok(name)
    }

    pub fn pending(&self) -> Vec<PendingUpload> {
        self.pending
            .iter()
            .map(|(name, data)| PendingUpload {
                name: name.clone(),
                size: data.len(),
            })
            .collect()
    }

    pub fn pending_names(&self) -> Vec<String> {
        self.pending.keys().cloned().collect()
    }

    /// Bytes of a pending upload. Cheap: `Bytes` is reference counted.
    pub fn pending_bytes(&self, name: &str) -> DfosResult<Bytes> {
        self.pending
            .get(name)
            .cloned()
            .ok_or_else(|| DfosError::FileNotFound(name.to_string()))
    }

    /// Store an extraction result for a pending upload.
    ///
    /// The upload leaves the pending list, the file's controls reset to
    /// defaults and a history entry is added.
    pub fn record(&mut self, name: &str, result: AnalysisResult, elapsed: Duration) -> FileOutcome {
        self.pending.remove(name);
        self.controls.retain(|(file, _), _| file != name);

        let outcome = FileOutcome {
            file: name.to_string(),
            success: result.is_success(),
            file_type: result.extraction().map(|e| e.file_type),
            message: result.error().map(|e| e.to_string()),
        };

        match &outcome.message {
            None => info!(file = %name, file_type = ?outcome.file_type, "Upload processed"),
            Some(message) => warn!(file = %name, error = %message, "Upload failed to process"),
        }

        self.push_history(HistoryEntry {
            id: Uuid::new_v4(),
            file: name.to_string(),
            processed_at: Utc::now(),
            success: outcome.success,
            file_type: outcome.file_type,
            message: outcome.message.clone(),
            duration_ms: elapsed.as_secs_f64() * 1000.0,
        });
        self.results.insert(name.to_string(), result);
        outcome
    }

    /// Keep a finished batch for display and log its totals.
    pub fn finish_batch(&mut self, report: BatchReport) -> BatchReport {
        info!(
            run_id = %report.run_id,
            succeeded = report.succeeded,
            failed = report.failed,
            "Batch finished"
        );
        self.last_batch = Some(report.clone());
        report
    }

    pub fn last_batch(&self) -> Option<&BatchReport> {
        self.last_batch.as_ref()
    }

    // ========================================================================
    // Results
    // ========================================================================

    pub fn result(&self, name: &str) -> DfosResult<&AnalysisResult> {
        self.results
            .get(name)
            .ok_or_else(|| DfosError::FileNotFound(name.to_string()))
    }

    pub fn extraction(&self, name: &str) -> DfosResult<&Extraction> {
        match self.result(name)? {
            AnalysisResult::Success(extraction) => Ok(&**extraction),
            AnalysisResult::Failure(err) => Err(DfosError::NotProcessed {
                name: name.to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Names of successfully processed files, in name order.
    pub fn processed_names(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|(_, result)| result.is_success())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    pub fn summaries(&self) -> Vec<FileSummary> {
        self.results
            .iter()
            .map(|(name, result)| {
                let extraction = result.extraction();
                FileSummary {
                    name: name.clone(),
                    success: result.is_success(),
                    file_type: extraction.map(|e| e.file_type),
                    distance_points: extraction.map(|e| e.distance_points),
                    time_samples: extraction.map(|e| e.time.len()),
                    error: result.error().map(|e| e.to_string()),
                }
            })
            .collect()
    }

    /// Drop one file, processed or pending, with its controls.
    pub fn remove(&mut self, name: &str) -> DfosResult<()> {
        let had_result = self.results.remove(name).is_some();
        let had_pending = self.pending.remove(name).is_some();
        if !had_result && !had_pending {
            return Err(DfosError::FileNotFound(name.to_string()));
        }
        self.controls.retain(|(file, _), _| file != name);
        info!(file = %name, "File removed");
        Ok(())
    }

    /// Drop all uploads, results and view state. History is kept.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.results.clear();
        self.controls.clear();
        self.overlay_ranges.clear();
        self.last_batch = None;
        info!("Session cleared");
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_front(entry);
        self.history.truncate(self.history_limit);
    }

    // ========================================================================
    // View controls
    // ========================================================================

    pub fn controls(&self, name: &str, channel: Channel) -> ChannelControls {
        self.controls
            .get(&(name.to_string(), channel))
            .copied()
            .unwrap_or_default()
    }

    /// Set offset and range for one channel of one file.
    ///
    /// Missing bounds default to the ends of the distance axis. On error the
    /// previous controls stay in effect.
    pub fn set_controls(
        &mut self,
        name: &str,
        channel: Channel,
        offset: f64,
        x_min: Option<usize>,
        x_max: Option<usize>,
    ) -> DfosResult<ChannelControls> {
        let extraction = self.extraction(name)?;
        if extraction.channel(channel).is_none() {
            return Err(DfosError::ChannelUnavailable {
                name: name.to_string(),
                channel: channel.to_string(),
            });
        }
        let points = extraction.distance_points;

        let range = match (x_min, x_max) {
            (None, None) => None,
            (min, max) => Some(XRange::resolve(
                min.unwrap_or(0),
                max.unwrap_or(usize::MAX),
                points,
            )?),
        };
        let controls = ChannelControls::new(offset, range)?;

        self.controls.insert((name.to_string(), channel), controls);
        Ok(controls)
    }

    pub fn overlay_range(&self, channel: Channel) -> Option<XRange> {
        self.overlay_ranges.get(&channel).copied()
    }

    /// Set the range shared by every file in the `channel` overlay.
    pub fn set_overlay_range(
        &mut self,
        channel: Channel,
        x_min: Option<usize>,
        x_max: Option<usize>,
    ) -> DfosResult<Option<XRange>> {
        let points = self
            .results
            .values()
            .filter_map(|r| r.extraction())
            .filter(|e| e.channel(channel).is_some())
            .map(|e| e.distance_points)
            .max()
            .ok_or_else(|| {
                DfosError::invalid(
                    "channel",
                    format!("no processed file carries {}", channel.label()),
                )
            })?;

        let range = match (x_min, x_max) {
            (None, None) => None,
            (min, max) => Some(XRange::resolve(
                min.unwrap_or(0),
                max.unwrap_or(usize::MAX),
                points,
            )?),
        };
        match range {
            Some(range) => self.overlay_ranges.insert(channel, range),
            None => self.overlay_ranges.remove(&channel),
        };
        Ok(range)
    }

    // ========================================================================
    // Views and exports
    // ========================================================================

    /// `channel` of `name` with the file's controls applied.
    pub fn channel_series(&self, name: &str, channel: Channel) -> DfosResult<ChannelSeries> {
        let extraction = self.extraction(name)?;
        let first_frame =
            extraction
                .first_frame(channel)
                .ok_or_else(|| DfosError::ChannelUnavailable {
                    name: name.to_string(),
                    channel: channel.to_string(),
                })?;
        ChannelSeries::from_first_frame(channel, first_frame, &self.controls(name, channel))
    }

    /// Every processed file carrying `channel`, each with its own offset and
    /// the shared overlay range. Files the range does not reach are left out.
    pub fn overlay(&self, channel: Channel) -> Vec<(String, ChannelSeries)> {
        let shared = self.overlay_range(channel);
        self.results
            .iter()
            .filter_map(|(name, result)| {
                let first_frame = result.extraction()?.first_frame(channel)?;
                let own = self.controls(name, channel);
                let controls = own.with_range(shared);
                ChannelSeries::from_first_frame(channel, first_frame, &controls)
                    .ok()
                    .map(|series| (name.clone(), series))
            })
            .collect()
    }

    pub fn report_file(&self, name: &str) -> DfosResult<ReportFile> {
        let extraction = self.extraction(name)?;
        Ok(ReportFile::new(name, extraction, |channel| {
            self.controls(name, channel)
        })?)
    }

    pub fn csv(&self, name: &str) -> DfosResult<Vec<u8>> {
        Ok(report::write_csv(&self.report_file(name)?)?)
    }

    pub fn single_report(&self, name: &str, generated_at: NaiveDateTime) -> DfosResult<Vec<u8>> {
        Ok(report::single_report(&self.report_file(name)?, generated_at)?)
    }

    pub fn comparison_report(
        &self,
        first: &str,
        second: &str,
        generated_at: NaiveDateTime,
    ) -> DfosResult<Vec<u8>> {
        let a = self.report_file(first)?;
        let b = self.report_file(second)?;
        Ok(report::comparison_report(&a, &b, generated_at)?)
    }
}

/// Strip any directory components a browser may send with a file name.
fn base_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bts_parser::extract_bytes;
    use test_utils::fixtures::{small_temp_strain, FixtureOpener};

    fn session() -> Session {
        Session::new(&DashboardConfig {
            max_upload_bytes: 1024 * 1024,
            history_limit: 3,
            temp_dir: None,
        })
    }

    /// Extract a pending upload inline and record it.
    fn run(session: &mut Session, name: &str) -> FileOutcome {
        let data = session.pending_bytes(name).unwrap();
        session.record(name, extract_bytes(&FixtureOpener, &data), Duration::ZERO)
    }

    fn processed(name: &str) -> Session {
        let mut session = session();
        session
            .add_upload(name, Bytes::from(small_temp_strain().to_bytes()))
            .unwrap();
        run(&mut session, name);
        session
    }

    #[test]
    fn test_add_upload_rejects_extension_and_size() {
        let mut session = session();
        let err = session.add_upload("notes.txt", Bytes::from_static(b"x")).unwrap_err();
        assert!(matches!(err, DfosError::UnsupportedUpload(_)));

        let big = Bytes::from(vec![0u8; 1024 * 1024 + 1]);
        let err = session.add_upload("big.h5", big).unwrap_err();
        assert_eq!(err.http_status_code(), 413);
        assert!(session.pending().is_empty());
    }

    #[test]
    fn test_add_upload_replaces_same_name() {
        let mut session = session();
        session.add_upload("dir/run.H5", Bytes::from_static(b"one")).unwrap();
        session.add_upload("run.H5", Bytes::from_static(b"three")).unwrap();
        assert_eq!(
            session.pending(),
            vec![PendingUpload {
                name: "run.H5".to_string(),
                size: 5
            }]
        );
    }

    #[test]
    fn test_offset_and_range_flow_through_views() {
        let mut session = processed("run.h5");
        session
            .set_controls("run.h5", Channel::Temperature, 5.0, Some(2), Some(6))
            .unwrap();

        let series = session.channel_series("run.h5", Channel::Temperature).unwrap();
        assert_eq!(series.values, vec![17.0, 18.0, 19.0, 20.0, 21.0]);
        assert_eq!(series.stats().unwrap().mean, 19.0);

        let csv = String::from_utf8(session.csv("run.h5").unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Distance_Index,Temperature_C,Strain_ue");
        assert_eq!(lines[1], "2,17,2");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_invalid_range_keeps_previous_controls() {
        let mut session = processed("run.h5");
        session
            .set_controls("run.h5", Channel::Strain, 1.0, Some(1), Some(3))
            .unwrap();
        let err = session
            .set_controls("run.h5", Channel::Strain, 0.0, Some(8), Some(4))
            .unwrap_err();
        assert_eq!(err.http_status_code(), 400);

        let controls = session.controls("run.h5", Channel::Strain);
        assert_eq!(controls.offset, 1.0);
        assert_eq!(controls.range, Some(XRange::new(1, 3)));
    }

    #[test]
    fn test_controls_for_missing_channel() {
        let mut session = processed("run.h5");
        let err = session
            .set_controls("run.h5", Channel::Amplitude, 0.0, None, None)
            .unwrap_err();
        assert!(matches!(err, DfosError::ChannelUnavailable { .. }));
    }

    #[test]
    fn test_failed_extraction_is_recorded() {
        let mut session = session();
        session.add_upload("b.bts", Bytes::from_static(b"garbage")).unwrap();
        let outcome = run(&mut session, "b.bts");
        assert!(!outcome.success);
        assert!(outcome.message.is_some());

        assert!(session.pending().is_empty());
        assert_eq!(session.result_count(), 1);
        assert!(session.processed_names().is_empty());
        let err = session.channel_series("b.bts", Channel::Strain).unwrap_err();
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_reprocessing_resets_controls() {
        let mut session = processed("run.h5");
        session
            .set_controls("run.h5", Channel::Temperature, 3.0, None, None)
            .unwrap();
        session
            .add_upload("run.h5", Bytes::from(small_temp_strain().to_bytes()))
            .unwrap();
        run(&mut session, "run.h5");
        assert_eq!(
            session.controls("run.h5", Channel::Temperature),
            ChannelControls::default()
        );
    }

    #[test]
    fn test_history_is_bounded_newest_first() {
        let mut session = session();
        for name in ["1.h5", "2.h5", "3.h5", "4.h5"] {
            session
                .add_upload(name, Bytes::from(small_temp_strain().to_bytes()))
                .unwrap();
            run(&mut session, name);
        }
        let files: Vec<_> = session.history().map(|h| h.file.as_str()).collect();
        assert_eq!(files, vec!["4.h5", "3.h5", "2.h5"]);

        session.clear();
        assert_eq!(session.history().count(), 3);
        session.clear_history();
        assert_eq!(session.history().count(), 0);
    }

    #[test]
    fn test_overlay_shares_range_keeps_offsets() {
        let mut session = processed("a.h5");
        session
            .add_upload("b.h5", Bytes::from(small_temp_strain().to_bytes()))
            .unwrap();
        run(&mut session, "b.h5");

        session
            .set_controls("b.h5", Channel::Temperature, 10.0, Some(0), Some(1))
            .unwrap();
        session
            .set_overlay_range(Channel::Temperature, Some(2), Some(4))
            .unwrap();

        let overlay = session.overlay(Channel::Temperature);
        assert_eq!(overlay.len(), 2);
        assert_eq!(overlay[0].0, "a.h5");
        assert_eq!(overlay[0].1.values, vec![12.0, 13.0, 14.0]);
        assert_eq!(overlay[1].1.values, vec![22.0, 23.0, 24.0]);

        assert!(session.overlay(Channel::Frequency).is_empty());
        assert!(session
            .set_overlay_range(Channel::Frequency, None, None)
            .is_err());
    }

    #[test]
    fn test_remove_and_missing_file() {
        let mut session = processed("run.h5");
        session.remove("run.h5").unwrap();
        assert_eq!(session.result_count(), 0);
        let err = session.remove("run.h5").unwrap_err();
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_reports_are_pdf() {
        let mut session = processed("a.h5");
        session
            .add_upload("b.h5", Bytes::from(small_temp_strain().to_bytes()))
            .unwrap();
        run(&mut session, "b.h5");

        let at = Utc::now().naive_utc();
        assert!(session.single_report("a.h5", at).unwrap().starts_with(b"%PDF-1.4"));
        assert!(session
            .comparison_report("a.h5", "b.h5", at)
            .unwrap()
            .starts_with(b"%PDF-1.4"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("C:\\data\\run.h5"), "run.h5");
        assert_eq!(base_name("/tmp/x/run.bts"), "run.bts");
        assert_eq!(base_name("run.h5"), "run.h5");
    }

    #[test]
    fn test_batch_report_counts() {
        let outcome = |file: &str, success| FileOutcome {
            file: file.to_string(),
            success,
            file_type: None,
            message: None,
        };
        let report = BatchReport::new(
            Uuid::new_v4(),
            Utc::now(),
            vec![outcome("a", true), outcome("b", false), outcome("c", true)],
        );
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
    }
}
