use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::overlay::domain::overlay_surface::OverlaySurface;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{BOX_STROKE_RGBA, BOX_STROKE_WIDTH};
use crate::shared::frame::Frame;

/// In-memory RGBA overlay backed by the `image` crate.
///
/// Transparent everywhere except where boxes were stroked. Can be blended
/// onto a frame or saved as a PNG.
pub struct RasterOverlay {
    canvas: RgbaImage,
    color: Rgba<u8>,
    stroke_width: u32,
}

impl RasterOverlay {
    pub fn new() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            color: Rgba(BOX_STROKE_RGBA),
            stroke_width: BOX_STROKE_WIDTH,
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Alpha-blends the overlay onto a frame of the same size.
    pub fn composite_onto(&self, frame: &mut Frame) -> Result<(), Box<dyn std::error::Error>> {
        if frame.native_size() != self.canvas.dimensions() {
            return Err(format!(
                "overlay is {:?} but frame is {:?}",
                self.canvas.dimensions(),
                frame.native_size()
            )
            .into());
        }

        let data = frame.data_mut();
        for (i, px) in self.canvas.pixels().enumerate() {
            let alpha = px[3] as u32;
            if alpha == 0 {
                continue;
            }
            let base = i * Frame::CHANNELS;
            for c in 0..Frame::CHANNELS {
                let under = data[base + c] as u32;
                data[base + c] = ((px[c] as u32 * alpha + under * (255 - alpha)) / 255) as u8;
            }
        }
        Ok(())
    }

    /// Writes the frame with the overlay burned in as an image file.
    pub fn save_composited(
        &self,
        frame: &Frame,
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut composed = frame.clone();
        self.composite_onto(&mut composed)?;
        let img = image::RgbImage::from_raw(
            composed.width(),
            composed.height(),
            composed.data().to_vec(),
        )
        .ok_or("Failed to create image from frame data")?;
        img.save(path)?;
        Ok(())
    }

    fn fill(&mut self, x0: u32, y0: u32, x1: u32, y1: u32) {
        let (w, h) = self.canvas.dimensions();
        for y in y0..y1.min(h) {
            for x in x0..x1.min(w) {
                self.canvas.put_pixel(x, y, self.color);
            }
        }
    }
}

impl Default for RasterOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlaySurface for RasterOverlay {
    fn resize(&mut self, width: u32, height: u32) {
        if self.canvas.dimensions() != (width, height) {
            self.canvas = RgbaImage::new(width, height);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.canvas.dimensions()
    }

    fn clear(&mut self) {
        for px in self.canvas.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }

    fn stroke_rect(&mut self, bbox: &BoundingBox) {
        let (w, h) = self.canvas.dimensions();
        let Some(clipped) = bbox.clamp_to(w, h) else {
            return;
        };
        let (x, y, bw, bh) = clipped.to_pixel_rect();
        let (x1, y1) = (x + bw, y + bh);
        let t = self.stroke_width;

        self.fill(x, y, x1, y + t); // top
        self.fill(x, y1.saturating_sub(t), x1, y1); // bottom
        self.fill(x, y, x + t, y1); // left
        self.fill(x1.saturating_sub(t), y, x1, y1); // right
    }

    fn export(&self, frame: &Frame, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.save_composited(frame, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(w: u32, h: u32) -> RasterOverlay {
        let mut o = RasterOverlay::new();
        o.resize(w, h);
        o
    }

    fn is_green(o: &RasterOverlay, x: u32, y: u32) -> bool {
        o.canvas().get_pixel(x, y).0 == BOX_STROKE_RGBA
    }

    #[test]
    fn test_starts_empty() {
        let o = RasterOverlay::new();
        assert_eq!(o.size(), (0, 0));
    }

    #[test]
    fn test_resize_matches_frame() {
        let o = overlay(64, 48);
        assert_eq!(o.size(), (64, 48));
    }

    #[test]
    fn test_stroke_draws_border_only() {
        let mut o = overlay(50, 50);
        o.stroke_rect(&BoundingBox::new(10.0, 10.0, 20.0, 20.0));
        assert!(is_green(&o, 10, 10));
        assert!(is_green(&o, 11, 20)); // left edge, second column
        assert!(is_green(&o, 29, 29)); // bottom-right corner
        assert!(!is_green(&o, 20, 20)); // interior
        assert!(!is_green(&o, 5, 5)); // outside
    }

    #[test]
    fn test_clear_removes_strokes() {
        let mut o = overlay(50, 50);
        o.stroke_rect(&BoundingBox::new(10.0, 10.0, 20.0, 20.0));
        o.clear();
        assert!(o.canvas().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_resize_to_new_size_discards_content() {
        let mut o = overlay(50, 50);
        o.stroke_rect(&BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        o.resize(40, 30);
        assert_eq!(o.size(), (40, 30));
        assert!(o.canvas().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_stroke_clips_to_canvas() {
        let mut o = overlay(20, 20);
        o.stroke_rect(&BoundingBox::new(15.0, 15.0, 30.0, 30.0));
        assert!(is_green(&o, 15, 15));
        assert!(is_green(&o, 19, 19));
    }

    #[test]
    fn test_stroke_outside_canvas_is_noop() {
        let mut o = overlay(20, 20);
        o.stroke_rect(&BoundingBox::new(50.0, 50.0, 5.0, 5.0));
        assert!(o.canvas().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_composite_burns_in_box() {
        let mut o = overlay(10, 10);
        o.stroke_rect(&BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        let mut frame = Frame::filled(10, 10, [10, 10, 10], 0);
        o.composite_onto(&mut frame).unwrap();
        assert_eq!(&frame.data()[0..3], &[0, 255, 0]);
        let center = (5 * 10 + 5) * 3;
        assert_eq!(&frame.data()[center..center + 3], &[10, 10, 10]);
    }

    #[test]
    fn test_composite_rejects_size_mismatch() {
        let o = overlay(10, 10);
        let mut frame = Frame::filled(5, 5, [0, 0, 0], 0);
        assert!(o.composite_onto(&mut frame).is_err());
    }

    #[test]
    fn test_save_composited_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snaps").join("frame.png");
        let mut o = overlay(16, 12);
        o.stroke_rect(&BoundingBox::new(2.0, 2.0, 8.0, 8.0));
        o.save_composited(&Frame::filled(16, 12, [0, 0, 0], 0), &path)
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 12));
        assert_eq!(img.get_pixel(2, 2).0, [0, 255, 0]);
    }
}
