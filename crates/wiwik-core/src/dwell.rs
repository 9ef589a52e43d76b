//! Page dwell-time instrumentation.
//!
//! Estimates how long a reader actually spent on a page: wall time minus
//! time credited to scrolling minus time spent halted. Timestamps are
//! milliseconds supplied by the caller.

use std::fmt;

use tracing::info;

use crate::config::DwellConfig;

/// Outcome reported when the page is left.
#[derive(Debug, Clone, PartialEq)]
pub struct DwellReport {
    pub total_ms: f64,
    pub url: String,
}

impl fmt::Display for DwellReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms spent on page {}", self.total_ms, self.url)
    }
}

#[derive(Debug, Clone)]
pub struct DwellTracker {
    start: u64,
    interval_ms: u64,
    scroll_penalty_ms: f64,
    scrolling_ms: f64,
    halted: bool,
    halted_since: u64,
    halted_total: u64,
    next_interval: u64,
}

impl DwellTracker {
    /// Start tracking at `start` (the page finished loading).
    pub fn new(config: &DwellConfig, start: u64) -> Self {
        let interval_ms = config.halt_interval_secs.saturating_mul(1000).max(1);
        Self {
            start,
            interval_ms,
            scroll_penalty_ms: config.scroll_penalty_ms,
            scrolling_ms: 0.0,
            halted: false,
            halted_since: start,
            halted_total: 0,
            next_interval: start.saturating_add(interval_ms),
        }
    }

    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    pub const fn scrolling_ms(&self) -> f64 {
        self.scrolling_ms
    }

    pub const fn halted_ms(&self) -> u64 {
        self.halted_total
    }

    fn toggle_halt(&mut self, now: u64) {
        if self.halted {
            self.halted = false;
            self.halted_total += now.saturating_sub(self.halted_since);
        } else {
            self.halted = true;
            self.halted_since = now;
        }
    }

    pub fn on_scroll(&mut self, now: u64) {
        self.scrolling_ms += self.scroll_penalty_ms;
        self.toggle_halt(now);
    }

    /// The periodic check fired at `now`.
    pub fn on_interval(&mut self, now: u64) {
        if now.saturating_sub(self.start) > self.interval_ms {
            self.toggle_halt(now);
        }
    }

    /// Fire every periodic check due by `now`.
    pub fn poll(&mut self, now: u64) {
        while self.next_interval <= now {
            let at = self.next_interval;
            self.on_interval(at);
            self.next_interval = at.saturating_add(self.interval_ms);
        }
    }

    /// The page is being left at `end`; log and return the estimate.
    pub fn finish(mut self, end: u64, url: &str) -> DwellReport {
        self.poll(end);
        self.toggle_halt(end);
        #[allow(clippy::cast_precision_loss)]
        let total_ms = end.saturating_sub(self.start) as f64
            - self.scrolling_ms
            - self.halted_total as f64;
        let report = DwellReport {
            total_ms,
            url: url.to_string(),
        };
        info!("{report}");
        report
    }
}
