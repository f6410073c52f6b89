use crate::detection::domain::face_detector::FaceDetector;
use crate::encoding::domain::face_encoder::FaceEncoder;
use crate::encoding::domain::face_signature::FaceSignature;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;

/// A detected face together with its identity signature.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub bbox: BoundingBox,
    pub signature: FaceSignature,
}

/// Black box from a frame to every face in it, in detection order.
///
/// Both the reference loader and the frame matcher go through this seam, so
/// tests can substitute a scripted analyzer for the ONNX models.
pub trait FaceAnalyzer: Send {
    fn analyze(&mut self, frame: &Frame)
        -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>>;
}

/// Runs a detector, then encodes each detected face.
pub struct DetectEncodeAnalyzer {
    detector: Box<dyn FaceDetector>,
    encoder: Box<dyn FaceEncoder>,
}

impl DetectEncodeAnalyzer {
    pub fn new(detector: Box<dyn FaceDetector>, encoder: Box<dyn FaceEncoder>) -> Self {
        Self { detector, encoder }
    }
}

impl FaceAnalyzer for DetectEncodeAnalyzer {
    fn analyze(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>> {
        let faces = self.detector.detect(frame)?;
        let mut observations = Vec::with_capacity(faces.len());
        for face in faces {
            let signature = self.encoder.encode(frame, &face.bbox)?;
            observations.push(FaceObservation {
                bbox: face.bbox,
                signature,
            });
        }
        Ok(observations)
    }
}
