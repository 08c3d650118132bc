use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{LocalFile, TaskId, UploadResponse, UploadStatus};
use crate::format::{format_file_size, format_rate};
use crate::progress::{SpeedMeter, TransferProgress};

pub const LABEL_PREPARING: &str = "Preparing...";
pub const LABEL_COMPLETE: &str = "Upload complete";
pub const LABEL_TOO_LARGE: &str = "File too large";
pub const LABEL_FAILED: &str = "Upload failed";
const INITIAL_SPEED: &str = "0 KB/s";

/// How an upload ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    Complete,
    /// HTTP 413; carries the text to show the user.
    TooLarge { detail: String },
    Failed { reason: String },
}

impl UploadOutcome {
    pub fn from_response(resp: &UploadResponse) -> Self {
        match resp.status {
            200 | 303 => UploadOutcome::Complete,
            413 => {
                let body = resp.body.trim();
                let detail = if body.is_empty() {
                    LABEL_TOO_LARGE.to_string()
                } else {
                    body.to_string()
                };
                UploadOutcome::TooLarge { detail }
            }
            status => UploadOutcome::Failed {
                reason: format!("HTTP {status}"),
            },
        }
    }

    pub fn status(&self) -> UploadStatus {
        match self {
            UploadOutcome::Complete => UploadStatus::Complete,
            UploadOutcome::TooLarge { .. } => UploadStatus::TooLarge,
            UploadOutcome::Failed { .. } => UploadStatus::Failed,
        }
    }
}

/// One file's upload lifecycle: `Preparing -> InProgress -> {Complete | TooLarge | Failed}`.
#[derive(Clone, Debug)]
pub struct UploadTask {
    id: TaskId,
    name: String,
    path: PathBuf,
    size: u64,
    transferred: u64,
    started: Instant,
    meter: SpeedMeter,
    status: UploadStatus,
    percent: f64,
    status_label: String,
    speed_label: String,
}

impl UploadTask {
    pub fn new(id: TaskId, file: &LocalFile, now: Instant, sample_interval: Duration) -> Self {
        Self {
            id,
            name: file.name.clone(),
            path: file.path.clone(),
            size: file.size,
            transferred: 0,
            started: now,
            meter: SpeedMeter::new(now, sample_interval),
            status: UploadStatus::Preparing,
            percent: 0.0,
            status_label: LABEL_PREPARING.to_string(),
            speed_label: INITIAL_SPEED.to_string(),
        }
    }

    /// Applies a progress event. Returns `false` when the event was ignored
    /// (no usable total, or the task already finished).
    pub fn on_progress(&mut self, event: TransferProgress, now: Instant) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let Some(percent) = event.percent() else {
            return false;
        };
        self.status = UploadStatus::InProgress;
        self.transferred = event.loaded;
        self.percent = percent;
        if let Some(rate) = self.meter.observe(event.loaded, now) {
            self.speed_label = format_rate(rate);
        }
        self.status_label = format!("{}% uploaded", percent.round());
        true
    }

    pub fn finish(&mut self, outcome: &UploadOutcome) {
        if self.status.is_terminal() {
            return;
        }
        self.status = outcome.status();
        match outcome {
            UploadOutcome::Complete => {
                self.status_label = LABEL_COMPLETE.to_string();
                self.speed_label.clear();
            }
            UploadOutcome::TooLarge { .. } => {
                self.status_label = LABEL_TOO_LARGE.to_string();
                self.speed_label.clear();
            }
            UploadOutcome::Failed { .. } => {
                self.status_label = LABEL_FAILED.to_string();
            }
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    pub fn speed_label(&self) -> &str {
        &self.speed_label
    }

    /// Row title, e.g. `"notes.txt (1.5 KB)"`.
    pub fn title(&self) -> String {
        format!("{} ({})", self.name, format_file_size(self.size as f64))
    }

    /// Only completed uploads leave the view on their own.
    pub fn auto_dismiss(&self) -> bool {
        self.status == UploadStatus::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(size: u64, now: Instant) -> UploadTask {
        let file = LocalFile {
            path: PathBuf::from("/tmp/a.bin"),
            name: "a.bin".into(),
            size,
        };
        UploadTask::new(TaskId(1), &file, now, Duration::from_millis(200))
    }

    fn resp(status: u16, body: &str) -> UploadResponse {
        UploadResponse {
            status,
            body: body.into(),
        }
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(UploadOutcome::from_response(&resp(200, "")), UploadOutcome::Complete);
        assert_eq!(UploadOutcome::from_response(&resp(303, "")), UploadOutcome::Complete);
        assert_eq!(
            UploadOutcome::from_response(&resp(413, "File too large. Maximum size is 1.0 MB\n")),
            UploadOutcome::TooLarge {
                detail: "File too large. Maximum size is 1.0 MB".into()
            }
        );
        assert_eq!(
            UploadOutcome::from_response(&resp(413, "  ")),
            UploadOutcome::TooLarge {
                detail: "File too large".into()
            }
        );
        // 201 is not one of the accepted success codes
        assert_eq!(UploadOutcome::from_response(&resp(201, "")).status(), UploadStatus::Failed);
        assert_eq!(UploadOutcome::from_response(&resp(500, "boom")).status(), UploadStatus::Failed);
    }

    #[test]
    fn starts_preparing() {
        let t = task(1536, Instant::now());
        assert_eq!(t.status(), UploadStatus::Preparing);
        assert_eq!(t.status_label(), "Preparing...");
        assert_eq!(t.speed_label(), "0 KB/s");
        assert_eq!(t.title(), "a.bin (1.5 KB)");
    }

    #[test]
    fn percent_is_monotonic_and_ends_at_100() {
        let t0 = Instant::now();
        let mut t = task(1000, t0);
        let mut prev = 0.0;
        for (i, loaded) in [0u64, 10, 250, 251, 600, 999, 1000].into_iter().enumerate() {
            let now = t0 + Duration::from_millis(i as u64 * 30);
            assert!(t.on_progress(TransferProgress { loaded, total: Some(1000) }, now));
            assert!(t.percent() >= prev);
            prev = t.percent();
        }
        assert_eq!(t.percent(), 100.0);
        assert_eq!(t.status_label(), "100% uploaded");
        assert_eq!(t.status(), UploadStatus::InProgress);
    }

    #[test]
    fn speed_label_updates_only_on_sample() {
        let t0 = Instant::now();
        let mut t = task(10_000, t0);
        t.on_progress(TransferProgress { loaded: 1024, total: Some(10_000) }, t0 + Duration::from_millis(100));
        assert_eq!(t.speed_label(), "0 KB/s");
        assert_eq!(t.status_label(), "10% uploaded");
        t.on_progress(TransferProgress { loaded: 2048, total: Some(10_000) }, t0 + Duration::from_millis(1000));
        assert_eq!(t.speed_label(), "2 KB/s");
    }

    #[test]
    fn uncomputable_events_are_ignored() {
        let t0 = Instant::now();
        let mut t = task(10, t0);
        assert!(!t.on_progress(TransferProgress { loaded: 5, total: None }, t0));
        assert_eq!(t.status(), UploadStatus::Preparing);
    }

    #[test]
    fn terminal_states_are_final() {
        let t0 = Instant::now();
        let mut t = task(10, t0);
        t.finish(&UploadOutcome::TooLarge { detail: "x".into() });
        assert_eq!(t.status(), UploadStatus::TooLarge);
        assert_eq!(t.status_label(), "File too large");
        assert_eq!(t.speed_label(), "");
        assert!(!t.auto_dismiss());

        assert!(!t.on_progress(TransferProgress { loaded: 10, total: Some(10) }, t0));
        t.finish(&UploadOutcome::Complete);
        assert_eq!(t.status(), UploadStatus::TooLarge);
    }

    #[test]
    fn failed_keeps_last_speed() {
        let t0 = Instant::now();
        let mut t = task(10, t0);
        t.finish(&UploadOutcome::Failed { reason: "HTTP 500".into() });
        assert_eq!(t.status_label(), "Upload failed");
        assert_eq!(t.speed_label(), "0 KB/s");
    }
}
