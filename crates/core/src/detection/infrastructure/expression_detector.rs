use crate::detection::domain::detection::Detection;
use crate::detection::domain::expression_classifier::ExpressionClassifier;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::frame::Frame;

/// Faces narrower or shorter than this (in pixels, after clamping) are
/// skipped.
const MIN_FACE_SIZE: f64 = 1.0;

/// Locates faces, then classifies the expression of each one.
///
/// Boxes are clamped to the frame first; sub-pixel and non-finite boxes
/// are dropped. A face whose classification fails is dropped with a
/// warning; the
/// remaining faces of the frame are still reported. Locator failures fail
/// the whole frame.
pub struct ExpressionDetector {
    locator: Box<dyn FaceLocator>,
    classifier: Box<dyn ExpressionClassifier>,
}

impl ExpressionDetector {
    pub fn new(locator: Box<dyn FaceLocator>, classifier: Box<dyn ExpressionClassifier>) -> Self {
        Self {
            locator,
            classifier,
        }
    }
}

impl FaceDetector for ExpressionDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error>> {
        let (fw, fh) = frame.native_size();
        let boxes = self.locator.locate(frame)?;

        let mut detections = Vec::with_capacity(boxes.len());
        for bbox in boxes {
            let Some(bbox) = bbox.clamp_to(fw, fh) else {
                continue;
            };
            if bbox.width < MIN_FACE_SIZE || bbox.height < MIN_FACE_SIZE {
                log::debug!("Skipping sub-pixel face box {bbox:?}");
                continue;
            }
            match self.classifier.classify(frame, &bbox) {
                Ok(scores) if !scores.is_empty() => detections.push(Detection::new(bbox, scores)),
                Ok(_) => log::warn!("Expression classifier returned no scores; face skipped"),
                Err(e) => log::warn!("Expression classification failed: {e}"),
            }
        }
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::domain::expression::Expression;
    use crate::emotion::domain::expression_scores::ExpressionScores;
    use crate::shared::bounding_box::BoundingBox;
    use rstest::rstest;

    struct StubLocator(Result<Vec<BoundingBox>, &'static str>);

    impl FaceLocator for StubLocator {
        fn locate(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            self.0.clone().map_err(|e| e.into())
        }
    }

    /// Classifies boxes left of x=50 as happy, fails on the rest.
    struct SideClassifier;

    impl ExpressionClassifier for SideClassifier {
        fn classify(
            &mut self,
            _frame: &Frame,
            bbox: &BoundingBox,
        ) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
            if bbox.x < 50.0 {
                Ok([(Expression::Happy, 0.8), (Expression::Sad, 0.2)]
                    .into_iter()
                    .collect())
            } else {
                Err("bad crop".into())
            }
        }
    }

    fn frame() -> Frame {
        Frame::filled(100, 100, [0, 0, 0], 0)
    }

    #[test]
    fn test_pairs_boxes_with_scores() {
        let mut detector = ExpressionDetector::new(
            Box::new(StubLocator(Ok(vec![BoundingBox::new(10.0, 10.0, 20.0, 20.0)]))),
            Box::new(SideClassifier),
        );
        let dets = detector.detect(&frame()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].dominant_expression(), Some(Expression::Happy));
    }

    #[test]
    fn test_failed_classification_drops_only_that_face() {
        let mut detector = ExpressionDetector::new(
            Box::new(StubLocator(Ok(vec![
                BoundingBox::new(10.0, 10.0, 20.0, 20.0),
                BoundingBox::new(60.0, 10.0, 20.0, 20.0),
            ]))),
            Box::new(SideClassifier),
        );
        let dets = detector.detect(&frame()).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].bbox.x, 10.0);
    }

    #[test]
    fn test_boxes_outside_frame_are_skipped() {
        let mut detector = ExpressionDetector::new(
            Box::new(StubLocator(Ok(vec![BoundingBox::new(-50.0, -50.0, 10.0, 10.0)]))),
            Box::new(SideClassifier),
        );
        assert!(detector.detect(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_boxes_are_clamped_before_classification() {
        let mut detector = ExpressionDetector::new(
            Box::new(StubLocator(Ok(vec![BoundingBox::new(-10.0, 0.0, 30.0, 20.0)]))),
            Box::new(SideClassifier),
        );
        let dets = detector.detect(&frame()).unwrap();
        assert_eq!(dets[0].bbox, BoundingBox::new(0.0, 0.0, 20.0, 20.0));
    }

    #[rstest]
    #[case::tiny(BoundingBox::new(10.0, 10.0, 0.2, 0.2))]
    #[case::thin(BoundingBox::new(10.0, 10.0, 20.0, 0.5))]
    #[case::sliver_at_edge(BoundingBox::new(99.5, 10.0, 20.0, 20.0))]
    #[case::nan(BoundingBox::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN))]
    #[case::infinite(BoundingBox::new(10.0, 10.0, f64::INFINITY, 20.0))]
    fn test_degenerate_boxes_are_skipped(#[case] bbox: BoundingBox) {
        let mut detector = ExpressionDetector::new(
            Box::new(StubLocator(Ok(vec![bbox]))),
            Box::new(SideClassifier),
        );
        assert!(detector.detect(&frame()).unwrap().is_empty());
    }

    #[test]
    fn test_one_pixel_box_is_kept() {
        let mut detector = ExpressionDetector::new(
            Box::new(StubLocator(Ok(vec![BoundingBox::new(10.0, 10.0, 1.0, 1.0)]))),
            Box::new(SideClassifier),
        );
        assert_eq!(detector.detect(&frame()).unwrap().len(), 1);
    }

    #[test]
    fn test_locator_error_fails_frame() {
        let mut detector =
            ExpressionDetector::new(Box::new(StubLocator(Err("no session"))), Box::new(SideClassifier));
        assert!(detector.detect(&frame()).is_err());
    }
}
