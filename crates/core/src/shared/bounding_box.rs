/// Axis-aligned face box in frame pixel coordinates.
///
/// Kept as floats because the locator reports sub-pixel geometry; callers
/// round only when touching pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from corner coordinates `(x1, y1, x2, y2)`.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Clips the box to a `width × height` frame.
    ///
    /// Returns `None` when nothing of the box lies inside the frame, or
    /// when any coordinate is NaN or infinite.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BoundingBox> {
        if !self.is_finite() {
            return None;
        }
        let x1 = self.x.max(0.0);
        let y1 = self.y.max(0.0);
        let x2 = self.right().min(width as f64);
        let y2 = self.bottom().min(height as f64);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(BoundingBox::from_corners(x1, y1, x2, y2))
    }

    /// Integer pixel rectangle `(x, y, w, h)` covering the box.
    pub fn to_pixel_rect(&self) -> (u32, u32, u32, u32) {
        let x = self.x.max(0.0).floor() as u32;
        let y = self.y.max(0.0).floor() as u32;
        let w = (self.right().ceil().max(0.0) as u32).saturating_sub(x);
        let h = (self.bottom().ceil().max(0.0) as u32).saturating_sub(y);
        (x, y, w, h)
    }
}
