use ndarray::ArrayView3;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Pixel format conversion happens in the video source; everything
/// downstream sees packed RGB24.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    sequence: usize,
}

impl Frame {
    pub const CHANNELS: usize = 3;

    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * Self::CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            sequence,
        }
    }

    /// A frame filled with one colour.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], sequence: usize) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * Self::CHANNELS)
            .collect();
        Self::new(data, width, height, sequence)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Native resolution the overlay must match.
    pub fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Position of this frame in capture order.
    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (self.height as usize, self.width as usize, Self::CHANNELS),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// ITU-R BT.601 luma of the pixel at `(x, y)`.
    pub fn luma(&self, x: u32, y: u32) -> f32 {
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        let (r, g, b) = (self.data[i], self.data[i + 1], self.data[i + 2]);
        0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
    }
}
