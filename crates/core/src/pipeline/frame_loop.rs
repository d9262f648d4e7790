use std::path::PathBuf;
use std::time::Instant;

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::emotion::domain::emotion_tally::EmotionTally;
use crate::emotion::domain::expression::Expression;
use crate::overlay::domain::overlay_surface::OverlaySurface;
use crate::presentation::domain::chart_widget::ChartWidget;
use crate::presentation::domain::status_display::StatusDisplay;
use crate::shared::constants::NO_FACE_STATUS;
use crate::shared::frame::Frame;
use crate::video::domain::video_source::VideoSource;

use super::frame_scheduler::FrameScheduler;
use super::loop_logger::LoopLogger;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// What one iteration of the loop did.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameOutcome {
    /// Faces were found; one dominant expression per face that had scores.
    Faces(Vec<Expression>),
    NoFace,
    /// The iteration failed and was abandoned. The loop keeps going.
    Skipped(String),
    /// The source ran dry; the loop is now stopped.
    EndOfStream,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameLoopError {
    #[error("frame loop has stopped and cannot be restarted")]
    Stopped,
}

/// Writes every `every`-th processed frame, overlay included, into `dir`.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotPolicy {
    pub dir: PathBuf,
    pub every: u64,
}

/// Everything the loop draws to or reports through.
pub struct LoopOutputs {
    pub overlay: Box<dyn OverlaySurface>,
    pub status: Box<dyn StatusDisplay>,
    pub chart: Box<dyn ChartWidget>,
    pub logger: Box<dyn LoopLogger>,
}

/// Per-frame detect, annotate and tally cycle.
///
/// The loop owns the session's [`EmotionTally`]; the chart only receives
/// snapshots. Each iteration is independent: a failure is logged and the
/// next scheduled iteration runs as usual.
pub struct FrameLoop {
    source: Box<dyn VideoSource>,
    detector: Box<dyn FaceDetector>,
    outputs: LoopOutputs,
    tally: EmotionTally,
    state: LoopState,
    snapshots: Option<SnapshotPolicy>,
    iterations: u64,
    failures: u64,
}

impl FrameLoop {
    /// `source` must already be open.
    pub fn new(
        source: Box<dyn VideoSource>,
        detector: Box<dyn FaceDetector>,
        outputs: LoopOutputs,
    ) -> Self {
        Self {
            source,
            detector,
            outputs,
            tally: EmotionTally::new(),
            state: LoopState::Idle,
            snapshots: None,
            iterations: 0,
            failures: 0,
        }
    }

    pub fn with_snapshots(mut self, policy: Option<SnapshotPolicy>) -> Self {
        self.snapshots = policy.filter(|p| p.every > 0);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn tally(&self) -> &EmotionTally {
        &self.tally
    }

    /// Iterations that reached the detector or failed trying.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Runs one iteration per scheduler tick until the scheduler is torn
    /// down or the source ends. The loop is `Stopped` afterwards.
    pub fn run(&mut self, scheduler: &mut dyn FrameScheduler) -> Result<(), FrameLoopError> {
        if self.state == LoopState::Stopped {
            return Err(FrameLoopError::Stopped);
        }
        self.start();

        while scheduler.next_tick() {
            if self.step() == FrameOutcome::EndOfStream {
                break;
            }
        }

        self.stop();
        self.outputs.logger.summary();
        Ok(())
    }

    /// Processes the next frame. A stopped loop does nothing and reports
    /// end of stream.
    pub fn step(&mut self) -> FrameOutcome {
        match self.state {
            LoopState::Stopped => return FrameOutcome::EndOfStream,
            LoopState::Idle => self.start(),
            LoopState::Running => {}
        }

        let t0 = Instant::now();
        let frame = match self.source.next_frame() {
            None => {
                self.outputs.logger.info("Video source ended");
                self.stop();
                return FrameOutcome::EndOfStream;
            }
            Some(Ok(frame)) => frame,
            Some(Err(e)) => return self.skip(e),
        };
        self.outputs.logger.timing("read", elapsed_ms(t0));

        self.iterations += 1;
        let outcome = match self.process(&frame) {
            Ok(outcome) => outcome,
            Err(e) => self.skip(e),
        };
        self.outputs.logger.progress(self.iterations as usize);
        outcome
    }

    /// Marks the loop stopped and releases the source. Idempotent.
    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            self.state = LoopState::Stopped;
            self.source.close();
            log::debug!("Frame loop stopped after {} iterations", self.iterations);
        }
    }

    fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
            log::debug!("Frame loop running");
        }
    }

    fn process(&mut self, frame: &Frame) -> Result<FrameOutcome, Box<dyn std::error::Error>> {
        let t0 = Instant::now();
        let detections = self.detector.detect(frame)?;
        self.outputs.logger.timing("detect", elapsed_ms(t0));
        self.outputs
            .logger
            .metric("faces", detections.len() as f64);

        let t1 = Instant::now();
        let (width, height) = frame.native_size();
        let overlay = &mut self.outputs.overlay;
        overlay.resize(width, height);
        overlay.clear();

        if detections.is_empty() {
            self.outputs.status.set_status(NO_FACE_STATUS);
            self.outputs.logger.timing("draw", elapsed_ms(t1));
            self.snapshot(frame);
            return Ok(FrameOutcome::NoFace);
        }

        let mut dominant = Vec::with_capacity(detections.len());
        let mut changed = false;
        for detection in &detections {
            overlay.stroke_rect(&detection.bbox);
            match detection.dominant_expression() {
                Some(expression) => {
                    self.outputs.status.set_status(expression.label());
                    changed |= self.tally.record(expression);
                    dominant.push(expression);
                }
                None => log::debug!("Face at {:?} has no expression scores", detection.bbox),
            }
        }
        self.outputs.logger.timing("draw", elapsed_ms(t1));

        self.snapshot(frame);
        if changed {
            self.outputs.chart.update(&self.tally.snapshot())?;
        }
        Ok(FrameOutcome::Faces(dominant))
    }

    fn skip(&mut self, error: Box<dyn std::error::Error>) -> FrameOutcome {
        self.failures += 1;
        log::warn!("Emotion detection error: {error}");
        FrameOutcome::Skipped(error.to_string())
    }

    fn snapshot(&self, frame: &Frame) {
        let Some(policy) = &self.snapshots else {
            return;
        };
        if self.iterations % policy.every != 0 {
            return;
        }
        let path = policy
            .dir
            .join(format!("frame_{:06}.png", frame.sequence()));
        match self.outputs.overlay.export(frame, &path) {
            Ok(()) => log::debug!("Saved snapshot {}", path.display()),
            Err(e) => log::warn!("Failed to save snapshot {}: {e}", path.display()),
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
