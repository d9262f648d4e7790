/// Properties of an opened video source.
///
/// `fps` is 0 when the source does not advertise a rate (common for
/// capture devices that negotiate it per frame).
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub codec: String,
    pub source: String,
    pub live: bool,
}

impl VideoMetadata {
    pub fn native_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
