use crate::emotion::domain::expression_scores::ExpressionScores;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Scores the expression of the face inside `bbox`.
///
/// `bbox` is already clamped to the frame.
pub trait ExpressionClassifier: Send {
    fn classify(
        &mut self,
        frame: &Frame,
        bbox: &BoundingBox,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>>;
}
