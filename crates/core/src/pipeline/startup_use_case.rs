use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::emotion::domain::emotion_tally::EmotionTally;
use crate::presentation::domain::user_alert::UserAlert;
use crate::shared::constants::{CAMERA_ALERT, MODEL_LOAD_ALERT, STARTUP_ALERT};
use crate::video::domain::video_source::VideoSource;

use super::frame_loop::{FrameLoop, LoopOutputs};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to load emotion detection models: {0}")]
    ModelLoad(String),
    #[error("failed to access camera: {0}")]
    Camera(String),
}

/// Brings the app up in order: models first, then the camera.
///
/// Either failure is logged, alerted to the user and returned; no frame
/// loop is built in that case.
pub struct StartupUseCase {
    alert: Box<dyn UserAlert>,
}

impl StartupUseCase {
    pub fn new(alert: Box<dyn UserAlert>) -> Self {
        Self { alert }
    }

    /// Returns an idle loop ready to `run`.
    ///
    /// `load_detector` is only invoked once; `source` is opened only after
    /// the models loaded.
    pub fn launch<F>(
        &mut self,
        load_detector: F,
        mut source: Box<dyn VideoSource>,
        mut outputs: LoopOutputs,
    ) -> Result<FrameLoop, StartupError>
    where
        F: FnOnce() -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>>,
    {
        let detector = match load_detector() {
            Ok(detector) => {
                outputs.logger.info("Models loaded successfully");
                detector
            }
            Err(e) => {
                log::error!("Error loading models: {e}");
                return Err(self.fail(MODEL_LOAD_ALERT, StartupError::ModelLoad(e.to_string())));
            }
        };

        let metadata = match source.open() {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Error accessing camera: {e}");
                return Err(self.fail(CAMERA_ALERT, StartupError::Camera(e.to_string())));
            }
        };
        let (width, height) = metadata.native_size();
        let rate = if metadata.fps > 0.0 {
            format!("{:.1} fps", metadata.fps)
        } else {
            "variable rate".to_string()
        };
        outputs.logger.info(&format!(
            "Opened {} ({width}x{height}, {}, {rate}, {})",
            metadata.source,
            metadata.codec,
            if metadata.live { "live" } else { "file" }
        ));

        if let Err(e) = outputs.chart.update(&EmotionTally::new().snapshot()) {
            log::warn!("Failed to draw initial chart: {e}");
        }

        Ok(FrameLoop::new(source, detector, outputs))
    }

    fn fail(&mut self, message: &str, error: StartupError) -> StartupError {
        self.alert.alert(message);
        self.alert.alert(STARTUP_ALERT);
        error
    }
}
