//! Progress snapshots and the terminal progress bar that renders them.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner frames indexed by [`ProgressSnapshot::spinner_frame`].
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Point-in-time view of a running search.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSnapshot {
    /// Increments by one per emitted snapshot.
    pub spinner_frame: usize,
    /// `attempts / total_space`, within `[0, 1]`.
    pub progress: f64,
    pub attempts: u64,
    pub elapsed: Duration,
    pub current: String,
}

/// Receives progress snapshots from a search.
pub trait ProgressSink {
    fn report(&mut self, snapshot: &ProgressSnapshot);
}

impl<F: FnMut(&ProgressSnapshot)> ProgressSink for F {
    fn report(&mut self, snapshot: &ProgressSnapshot) {
        self(snapshot)
    }
}

/// Fraction of the keyspace covered after `attempts`, clamped to `[0, 1]`.
pub fn progress_fraction(attempts: u64, total_space: u64) -> f64 {
    if total_space == 0 {
        return 1.0;
    }
    (attempts as f64 / total_space as f64).clamp(0.0, 1.0)
}

/// Wall-clock throttle deciding when a snapshot is due.
#[derive(Debug)]
pub(crate) struct Reporter {
    start: Instant,
    last_report: Instant,
    interval: Duration,
    total_space: u64,
    frame: usize,
    progress: f64,
}

impl Reporter {
    pub(crate) fn new(start: Instant, interval: Duration, total_space: u64) -> Self {
        Self {
            start,
            last_report: start,
            interval,
            total_space,
            frame: 0,
            progress: 0.0,
        }
    }

    /// Emits a snapshot if at least `interval` has passed since the last one.
    pub(crate) fn maybe_report<S>(&mut self, sink: &mut S, attempts: u64, current: &str)
    where
        S: ProgressSink + ?Sized,
    {
        let now = Instant::now();
        if now.duration_since(self.last_report) < self.interval {
            return;
        }

        // Concurrent counters may be read slightly out of order; never go backwards.
        self.progress = self
            .progress
            .max(progress_fraction(attempts, self.total_space));

        sink.report(&ProgressSnapshot {
            spinner_frame: self.frame,
            progress: self.progress,
            attempts,
            elapsed: now.duration_since(self.start),
            current: current.to_string(),
        });

        self.frame = self.frame.wrapping_add(1);
        self.last_report = now;
    }
}

/// Renders snapshots as an `indicatif` progress bar on stderr.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    /// A bar sized to `total_space` candidates.
    pub fn new(total_space: u64) -> Self {
        let bar = ProgressBar::new(total_space);
        bar.set_style(
            ProgressStyle::with_template(
                "{prefix:.green} {percent:>3}% [{wide_bar:.cyan/blue}] {human_pos}/{human_len} \
                 ({elapsed_precise}, {eta} remaining) {msg}",
            )
            .expect("valid progress template")
            .progress_chars("█▉▊▋▌▍▎▏░"),
        );
        Self { bar }
    }

    /// Removes the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for ConsoleProgress {
    fn report(&mut self, snapshot: &ProgressSnapshot) {
        self.bar
            .set_prefix(SPINNER_FRAMES[snapshot.spinner_frame % SPINNER_FRAMES.len()]);
        self.bar.set_position(snapshot.attempts);
        self.bar.set_message(snapshot.current.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction_is_clamped() {
        assert_eq!(progress_fraction(0, 10), 0.0);
        assert_eq!(progress_fraction(5, 10), 0.5);
        assert_eq!(progress_fraction(12, 10), 1.0);
        assert_eq!(progress_fraction(3, 0), 1.0);
    }

    #[test]
    fn test_reporter_throttles_by_time() {
        let mut snapshots = Vec::new();
        let mut sink = |s: &ProgressSnapshot| snapshots.push(s.clone());

        let mut reporter = Reporter::new(Instant::now(), Duration::from_secs(3600), 100);
        for attempt in 1..=50 {
            reporter.maybe_report(&mut sink, attempt, "x");
        }
        assert!(snapshots.is_empty());
    }

    #[test]
    fn test_reporter_frames_and_monotonic_progress() {
        let mut snapshots = Vec::new();
        let mut sink = |s: &ProgressSnapshot| snapshots.push(s.clone());

        let mut reporter = Reporter::new(Instant::now(), Duration::ZERO, 10);
        reporter.maybe_report(&mut sink, 4, "a");
        reporter.maybe_report(&mut sink, 3, "b");
        reporter.maybe_report(&mut sink, 10, "c");

        let frames: Vec<usize> = snapshots.iter().map(|s| s.spinner_frame).collect();
        assert_eq!(frames, [0, 1, 2]);
        let progress: Vec<f64> = snapshots.iter().map(|s| s.progress).collect();
        assert_eq!(progress, [0.4, 0.4, 1.0]);
        assert_eq!(snapshots[1].current, "b");
    }
}
