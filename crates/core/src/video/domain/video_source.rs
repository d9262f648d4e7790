use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// A live (or replayed) stream of frames.
///
/// The frame loop pulls one frame per refresh; implementations hide the
/// device, codec and pixel format details.
pub trait VideoSource: Send {
    /// Acquires the underlying device or file and reports its metadata.
    fn open(&mut self) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns the next frame, or `None` once the stream has ended.
    ///
    /// A live camera never ends; a file source ends at EOF.
    fn next_frame(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>>;

    /// Releases the device or file. Safe to call more than once.
    fn close(&mut self);
}
