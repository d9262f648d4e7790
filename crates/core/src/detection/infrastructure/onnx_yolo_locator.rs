/// YOLO face locator using ONNX Runtime via `ort`.
///
/// Letterboxes the frame, runs the WIDER FACE pose model, and decodes its
/// boxes with NMS. Keypoints in the model output are ignored.
use std::path::Path;

use crate::detection::domain::face_locator::FaceLocator;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

use super::math::{nms, ScoredBox};

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face boxes.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_GRAY: f32 = 114.0 / 255.0;

pub struct OnnxYoloLocator {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloLocator {
    /// Loads the model. The input resolution is read from the model's NCHW
    /// input shape, falling back to 640 when it is dynamic.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::debug!("Face locator input size: {input_size}");

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceLocator for OnnxYoloLocator {
    fn locate(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
        let (fw, fh) = frame.native_size();
        if fw == 0 || fh == 0 {
            return Ok(Vec::new());
        }

        let letterboxed = letterbox(frame, self.input_size);
        let input_value = ort::value::Tensor::from_array(letterboxed.tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("unexpected face model output shape: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("face model output is not contiguous")?;

        let mut candidates = decode_rows(data, &shape, self.confidence, &letterboxed.mapping);
        let kept = nms(&mut candidates, NMS_IOU_THRESH);

        Ok(kept
            .into_iter()
            .filter_map(|d| {
                let [x1, y1, x2, y2] = d.corners;
                BoundingBox::from_corners(x1, y1, x2, y2).clamp_to(fw, fh)
            })
            .collect())
    }
}

/// Maps letterboxed model coordinates back to frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct LetterboxMapping {
    scale: f64,
    pad_x: f64,
    pad_y: f64,
}

impl LetterboxMapping {
    fn to_frame(&self, x: f64, y: f64) -> (f64, f64) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

struct Letterboxed {
    tensor: ndarray::Array4<f32>,
    mapping: LetterboxMapping,
}

/// Aspect-preserving nearest-neighbour resize into a padded
/// `target × target` NCHW tensor normalized to [0, 1].
fn letterbox(frame: &Frame, target: u32) -> Letterboxed {
    let (fw, fh) = frame.native_size();
    let scale = (target as f64 / fw as f64).min(target as f64 / fh as f64);
    let new_w = ((fw as f64 * scale).round() as u32).min(target);
    let new_h = ((fh as f64 * scale).round() as u32).min(target);
    let pad_x = (target - new_w) / 2;
    let pad_y = (target - new_h) / 2;

    let t = target as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, t, t), PAD_GRAY);
    let src = frame.as_ndarray();

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(fh as usize - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(fw as usize - 1);
            for c in 0..3 {
                tensor[[0, c, pad_y as usize + y, pad_x as usize + x]] =
                    src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    Letterboxed {
        tensor,
        mapping: LetterboxMapping {
            scale,
            pad_x: pad_x as f64,
            pad_y: pad_y as f64,
        },
    }
}

/// Decodes raw YOLO rows `[cx, cy, w, h, conf, ...]` above `confidence`.
///
/// The output is either `[1, features, detections]` (transposed, the usual
/// export) or `[1, detections, features]`; the smaller axis is features.
fn decode_rows(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    mapping: &LetterboxMapping,
) -> Vec<ScoredBox> {
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Vec::new();
    }

    let value = |det: usize, feat: usize| -> f64 {
        let i = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[i] as f64
    };

    (0..num_dets)
        .filter(|&i| value(i, 4) >= confidence)
        .map(|i| {
            let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
            let (x1, y1) = mapping.to_frame(cx - w / 2.0, cy - h / 2.0);
            let (x2, y2) = mapping.to_frame(cx + w / 2.0, cy + h / 2.0);
            ScoredBox {
                corners: [x1, y1, x2, y2],
                score: value(i, 4),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const IDENTITY: LetterboxMapping = LetterboxMapping {
        scale: 1.0,
        pad_x: 0.0,
        pad_y: 0.0,
    };

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 → 640: scale 3.2, content 640x320, vertical pad 160
        let frame = Frame::filled(200, 100, [128, 128, 128], 0);
        let lb = letterbox(&frame, 640);
        assert_eq!(lb.tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(lb.mapping.scale, 3.2);
        assert_relative_eq!(lb.mapping.pad_x, 0.0);
        assert_relative_eq!(lb.mapping.pad_y, 160.0);
    }

    #[test]
    fn test_letterbox_fills_padding_gray() {
        let frame = Frame::filled(100, 50, [255, 255, 255], 0);
        let lb = letterbox(&frame, 640);
        assert!((lb.tensor[[0, 0, 0, 0]] - PAD_GRAY).abs() < 1e-6);
        let inside_y = lb.mapping.pad_y as usize + 1;
        assert!((lb.tensor[[0, 0, inside_y, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mapping_inverts_letterbox() {
        let mapping = LetterboxMapping {
            scale: 2.0,
            pad_x: 10.0,
            pad_y: 20.0,
        };
        let (x, y) = mapping.to_frame(110.0, 220.0);
        assert_relative_eq!(x, 50.0);
        assert_relative_eq!(y, 100.0);
    }

    #[test]
    fn test_decode_rows_row_major() {
        // six detections, 5 features each: [cx, cy, w, h, conf]
        let mut data = vec![0.0f32; 6 * 5];
        data[..5].copy_from_slice(&[50.0, 50.0, 20.0, 40.0, 0.9]);
        data[5..10].copy_from_slice(&[10.0, 10.0, 4.0, 4.0, 0.1]);
        let dets = decode_rows(&data, &[1, 6, 5], 0.5, &IDENTITY);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].corners, [40.0, 30.0, 60.0, 70.0]);
        assert_relative_eq!(dets[0].score, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_rows_transposed() {
        // features along axis 1: 5 features x 6 detections
        let num_dets = 6;
        let mut data = vec![0.0f32; 5 * num_dets];
        let det = 3;
        let feats = [100.0, 80.0, 10.0, 10.0, 0.8];
        for (f, v) in feats.iter().enumerate() {
            data[f * num_dets + det] = *v;
        }
        let dets = decode_rows(&data, &[1, 5, num_dets], 0.5, &IDENTITY);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].corners, [95.0, 75.0, 105.0, 85.0]);
    }

    #[test]
    fn test_decode_rows_too_few_features() {
        let data = [1.0f32; 8];
        assert!(decode_rows(&data, &[1, 2, 4], 0.0, &IDENTITY).is_empty());
    }
}
