use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// A source of RGB frames: a video file, a still image, or a capture device.
///
/// Implementations own the underlying handle from `open` until `close` (or
/// drop), so the pipeline only ever sees [`Frame`] and [`VideoMetadata`].
pub trait VideoReader: Send {
    /// Opens the source named by `path` and reports its properties.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Frames in decode order. An `Err` item means the source failed
    /// mid-stream; callers treat it as the end of the stream.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases the source. Safe to call more than once.
    fn close(&mut self);
}
