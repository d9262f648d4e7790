use std::collections::HashMap;
use std::time::Instant;

/// Observer for frame loop events.
///
/// Keeps the loop free of any particular output mechanism; the CLI logs and
/// summarizes, tests discard.
pub trait LoopLogger: Send {
    /// Report how many frames have been processed so far.
    fn progress(&mut self, frames: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces per frame).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullLoopLogger;

impl LoopLogger for NullLoopLogger {
    fn progress(&mut self, _frames: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI logger that tracks per-stage timing and metrics and reports a
/// summary when the loop stops.
///
/// Progress output is throttled to every `throttle_frames` frames.
pub struct StdoutLoopLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames: usize,
}

impl StdoutLoopLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames: 0,
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames;
        let mut lines = vec![format!(
            "Session summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:8}: avg {avg_ms:6.1}ms  max {:6.1}ms  total {total_ms:7.0}ms",
                durations.iter().copied().fold(0.0, f64::max)
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            lines.push(format!("  {name}: avg {:.1}", mean(&self.metrics[name])));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Refresh rate: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutLoopLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl LoopLogger for StdoutLoopLogger {
    fn progress(&mut self, frames: usize) {
        self.frames = frames;
        if frames % self.throttle_frames == 0 {
            log::info!("Processed {frames} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullLoopLogger;
        logger.progress(1);
        logger.timing("detect", 5.0);
        logger.metric("faces", 1.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutLoopLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("draw", 1.5);

        assert_eq!(logger.timings_for("detect").unwrap(), &[20.0, 30.0]);
        assert_eq!(logger.timings_for("draw").unwrap(), &[1.5]);
        assert!(logger.timings_for("read").is_none());
    }

    #[test]
    fn test_summary_includes_stages_metrics_and_rate() {
        let mut logger = StdoutLoopLogger::new(10);
        logger.progress(4);
        logger.timing("detect", 20.0);
        logger.timing("read", 2.0);
        logger.metric("faces", 1.0);
        logger.metric("faces", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Session summary (4 frames"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("read"));
        assert!(summary.contains("faces: avg 1.5"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutLoopLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_frame_count() {
        let mut logger = StdoutLoopLogger::new(10);
        for i in 1..=25 {
            logger.progress(i);
        }
        assert_eq!(logger.frames, 25);
    }

    #[test]
    fn test_mean() {
        assert_relative_eq!(mean(&[10.0, 20.0, 30.0]), 20.0);
        assert_relative_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_default_throttle() {
        assert_eq!(StdoutLoopLogger::default().throttle_frames, 100);
    }
}
