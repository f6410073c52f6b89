use crate::encoding::domain::face_signature::FaceSignature;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// Domain interface for turning a detected face into an identity signature.
pub trait FaceEncoder: Send {
    fn encode(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceSignature, Box<dyn std::error::Error>>;
}
