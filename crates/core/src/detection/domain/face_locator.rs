use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Finds face boxes only, without classifying them.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;
}
