use std::time::{Duration, Instant};

/// One progress tick of the currently running job.
///
/// `remaining` is only present when `total` is known and throughput so
/// far is positive. Not persisted; recomputed on every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub processed: u64,
    pub total: Option<u64>,
    pub elapsed: Duration,
    pub remaining: Option<Duration>,
}

/// Receives progress events from the worker.
///
/// Returning `false` requests cancellation; checkpoint-aware callers
/// convert that into an explicit `Cancelled` result instead of
/// unwinding through the callback.
pub trait ProgressSink: Send {
    fn tick(&mut self, update: &ProgressUpdate) -> bool;
}

/// Sink that discards all events and never requests cancellation.
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn tick(&mut self, _update: &ProgressUpdate) -> bool {
        true
    }
}

/// Turns raw progress counts into well-formed [`ProgressUpdate`]s.
///
/// Owns the job-start timestamp and enforces the invariants: `processed`
/// is monotonically non-decreasing and never exceeds `total` when the
/// total is known.
pub struct ProgressTracker {
    started: Instant,
    high_water: u64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            high_water: 0,
        }
    }

    pub fn update(&mut self, processed: u64, total: Option<u64>) -> ProgressUpdate {
        let elapsed = self.started.elapsed();
        self.update_with_elapsed(processed, total, elapsed)
    }

    pub fn update_with_elapsed(
        &mut self,
        processed: u64,
        total: Option<u64>,
        elapsed: Duration,
    ) -> ProgressUpdate {
        let mut processed = processed.max(self.high_water);
        if let Some(total) = total {
            processed = processed.min(total);
        }
        self.high_water = processed;

        let remaining = match total {
            Some(total) if processed > 0 && elapsed > Duration::ZERO => {
                let rate = processed as f64 / elapsed.as_secs_f64();
                (rate > 0.0)
                    .then(|| Duration::from_secs_f64((total - processed) as f64 / rate))
            }
            _ => None,
        };

        ProgressUpdate {
            processed,
            total,
            elapsed,
            remaining,
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line rendering shared by the CLI progress display and the GUI
/// log view, e.g. `Processed: 50 of 100 | elapsed: 1.0s | remaining: 1.0s`.
pub fn format_progress(update: &ProgressUpdate) -> String {
    let mut line = format!("Processed: {}", update.processed);
    if let Some(total) = update.total {
        line.push_str(&format!(" of {total}"));
    }
    line.push_str(&format!(" | elapsed: {:.1}s", update.elapsed.as_secs_f64()));
    if let Some(remaining) = update.remaining {
        line.push_str(&format!(" | remaining: {:.1}s", remaining.as_secs_f64()));
    }
    line
}
