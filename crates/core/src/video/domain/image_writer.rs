use std::path::Path;

use crate::shared::frame::Frame;

/// Persists or encodes a single RGB frame.
pub trait ImageWriter: Send {
    /// Writes `frame` to `path`, picking the format from the extension.
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Encodes `frame` as JPEG in memory.
    fn encode_jpeg(&self, frame: &Frame, quality: u8) -> Result<Vec<u8>, Box<dyn std::error::Error>>;
}
