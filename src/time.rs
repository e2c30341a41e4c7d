use std::time::{Duration, Instant};

/// Nominal period for a rate in Hz.
pub fn period(rate: f32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(rate.max(f32::EPSILON)))
}

/// Rolling count of rendered and skipped frames, reported once per interval.
pub struct FpsCounter {
    interval: Duration,
    since: Instant,
    rendered: u32,
    skipped: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsReport {
    pub fps: f32,
    pub skipped: u32,
}

impl FpsCounter {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self { interval, since: now, rendered: 0, skipped: 0 }
    }

    pub fn rendered(&mut self) {
        self.rendered += 1;
    }

    pub fn skipped(&mut self) {
        self.skipped += 1;
    }

    /// A report once `interval` has passed since the last one.
    pub fn poll(&mut self, now: Instant) -> Option<FpsReport> {
        let elapsed = now.saturating_duration_since(self.since);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }

        let report = FpsReport {
            fps: self.rendered as f32 / elapsed.as_secs_f32(),
            skipped: self.skipped,
        };
        self.since = now;
        self.rendered = 0;
        self.skipped = 0;
        Some(report)
    }
}
