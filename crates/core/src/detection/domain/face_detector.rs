use crate::shared::frame::Frame;

use super::detection::Detection;

/// Finds every face in a frame together with its expression scores.
///
/// Implementations may hold inference sessions, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>>;
}
