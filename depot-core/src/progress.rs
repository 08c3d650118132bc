use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// One progress notification from a streaming request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    /// `None` when the total is not known up front.
    pub total: Option<u64>,
}

impl TransferProgress {
    /// Percentage in `0..=100`, or `None` for events without a usable total.
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64 * 100.0).min(100.0)),
            _ => None,
        }
    }
}

pub type ProgressSender = mpsc::UnboundedSender<TransferProgress>;
pub type ProgressReceiver = mpsc::UnboundedReceiver<TransferProgress>;

pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    mpsc::unbounded_channel()
}

/// Debounced throughput sampler.
///
/// A new rate is produced only when at least `interval` has passed since the
/// previous sample; in between, `observe` returns `None` and the caller keeps
/// showing the last rate.
#[derive(Clone, Debug)]
pub struct SpeedMeter {
    interval: Duration,
    last_time: Instant,
    last_loaded: u64,
    current: Option<f64>,
}

impl SpeedMeter {
    pub fn new(start: Instant, interval: Duration) -> Self {
        Self {
            interval,
            last_time: start,
            last_loaded: 0,
            current: None,
        }
    }

    pub fn observe(&mut self, loaded: u64, now: Instant) -> Option<f64> {
        let elapsed = now.saturating_duration_since(self.last_time);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }
        let delta = loaded.saturating_sub(self.last_loaded);
        let rate = delta as f64 / elapsed.as_secs_f64();
        self.last_loaded = loaded;
        self.last_time = now;
        self.current = Some(rate);
        Some(rate)
    }

    /// Last computed rate in bytes per second.
    pub fn current(&self) -> Option<f64> {
        self.current
    }

    pub fn last_sample_at(&self) -> Instant {
        self.last_time
    }

    pub fn last_sample_bytes(&self) -> u64 {
        self.last_loaded
    }
}
