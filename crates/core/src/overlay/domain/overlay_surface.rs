use std::path::Path;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Drawable layer laid over the video, in frame pixel coordinates.
pub trait OverlaySurface: Send {
    /// Matches the surface to the frame's native resolution. Resizing may
    /// discard existing content.
    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    /// Removes everything drawn so far.
    fn clear(&mut self);

    /// Outlines a face box.
    fn stroke_rect(&mut self, bbox: &BoundingBox);

    /// Saves `frame` with the current overlay burned in.
    fn export(&self, frame: &Frame, path: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
