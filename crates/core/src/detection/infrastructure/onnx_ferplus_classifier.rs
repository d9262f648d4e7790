/// FER+ expression classifier using ONNX Runtime via `ort`.
///
/// The model takes a 64×64 grayscale face crop with raw 0–255 intensities
/// and returns eight logits.
use std::path::Path;

use crate::detection::domain::expression_classifier::ExpressionClassifier;
use crate::emotion::domain::expression::Expression;
use crate::emotion::domain::expression_scores::ExpressionScores;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::math::softmax;

const INPUT_SIZE: usize = 64;

/// Output classes in model order.
const FERPLUS_CLASSES: [Expression; 8] = [
    Expression::Neutral,
    Expression::Happy,
    Expression::Surprised,
    Expression::Sad,
    Expression::Angry,
    Expression::Disgusted,
    Expression::Fearful,
    Expression::Contempt,
];

pub struct OnnxFerPlusClassifier {
    session: ort::session::Session,
}

impl OnnxFerPlusClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;
        Ok(Self { session })
    }
}

impl ExpressionClassifier for OnnxFerPlusClassifier {
    fn classify(
        &mut self,
        frame: &Frame,
        bbox: &BoundingBox,
    ) -> Result<ExpressionScores, Box<dyn std::error::Error>> {
        let input = face_tensor(frame, bbox, INPUT_SIZE).ok_or("face crop is empty")?;
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("expression model produced no outputs".into());
        }
        let logits = outputs[0].try_extract_array::<f32>()?;
        let logits: Vec<f32> = logits.iter().copied().collect();
        if logits.len() < FERPLUS_CLASSES.len() {
            return Err(format!(
                "expression model returned {} logits, expected {}",
                logits.len(),
                FERPLUS_CLASSES.len()
            )
            .into());
        }

        Ok(scores_from_logits(&logits[..FERPLUS_CLASSES.len()]))
    }
}

fn scores_from_logits(logits: &[f32]) -> ExpressionScores {
    FERPLUS_CLASSES
        .iter()
        .copied()
        .zip(softmax(logits))
        .collect()
}

/// Samples the face box into a `[1, 1, size, size]` luma tensor.
///
/// Returns `None` when the box covers no pixels of the frame.
fn face_tensor(frame: &Frame, bbox: &BoundingBox, size: usize) -> Option<ndarray::Array4<f32>> {
    let (fw, fh) = frame.native_size();
    let clamped = bbox.clamp_to(fw, fh)?;
    let (x0, y0, w, h) = clamped.to_pixel_rect();
    if w == 0 || h == 0 {
        return None;
    }

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, size, size));
    for ty in 0..size {
        let sy = (y0 + ((ty as f64 + 0.5) * h as f64 / size as f64) as u32).min(fh - 1);
        for tx in 0..size {
            let sx = (x0 + ((tx as f64 + 0.5) * w as f64 / size as f64) as u32).min(fw - 1);
            tensor[[0, 0, ty, tx]] = frame.luma(sx, sy);
        }
    }
    Some(tensor)
}
