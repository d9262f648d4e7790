use std::time::{Duration, Instant};

use crate::pipeline::frame_scheduler::FrameScheduler;
use crate::shared::constants::DEFAULT_REFRESH_FPS;

/// Fixed-rate scheduler backed by a crossbeam ticker.
///
/// The first tick fires immediately; later ticks follow the refresh
/// interval. If an iteration overruns, the missed ticks collapse into one
/// instead of bursting. Teardown happens once the optional frame budget is
/// spent.
pub struct RefreshScheduler {
    ticker: crossbeam_channel::Receiver<Instant>,
    max_frames: Option<u64>,
    ticks: u64,
}

impl RefreshScheduler {
    /// Non-positive or non-finite rates fall back to the default refresh rate.
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_REFRESH_FPS
        };
        Self {
            ticker: crossbeam_channel::tick(Duration::from_secs_f64(1.0 / fps)),
            max_frames: None,
            ticks: 0,
        }
    }

    pub fn with_max_frames(mut self, max_frames: Option<u64>) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn torn_down(&self) -> bool {
        self.max_frames.is_some_and(|max| self.ticks >= max)
    }
}

impl FrameScheduler for RefreshScheduler {
    fn next_tick(&mut self) -> bool {
        if self.torn_down() {
            return false;
        }
        if self.ticks > 0 {
            if self.ticker.recv().is_err() {
                return false;
            }
            // Drop ticks that piled up during a slow iteration
            while self.ticker.try_recv().is_ok() {}
        }
        self.ticks += 1;
        true
    }
}
