use crate::emotion::domain::expression::Expression;
use crate::emotion::domain::expression_scores::ExpressionScores;
use crate::shared::bounding_box::BoundingBox;

/// One face found in one frame, with its expression scores.
///
/// Lives for a single loop iteration.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub expressions: ExpressionScores,
}

impl Detection {
    pub fn new(bbox: BoundingBox, expressions: ExpressionScores) -> Self {
        Self { bbox, expressions }
    }

    pub fn dominant_expression(&self) -> Option<Expression> {
        self.expressions.dominant()
    }
}
