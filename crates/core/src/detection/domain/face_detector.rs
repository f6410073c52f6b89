use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// One face found by a detector.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub bbox: BoundingBox,
    pub confidence: f64,
}

/// Domain interface for face detection.
///
/// Faces are returned in the detector's own order; callers preserve it.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;
}
