/// ArcFace face encoder using ONNX Runtime.
///
/// Crops a square around each detected face, resamples it to the model's
/// 112×112 input and returns the L2-normalized 512-d embedding.
use std::path::Path;

use crate::encoding::domain::face_encoder::FaceEncoder;
use crate::encoding::domain::face_signature::FaceSignature;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::onnx_session::open_session;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;
const EMBEDDING_DIM: usize = 512;

pub struct OnnxArcFaceEncoder {
    session: ort::session::Session,
}

impl OnnxArcFaceEncoder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
        })
    }
}

impl FaceEncoder for OnnxArcFaceEncoder {
    fn encode(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<FaceSignature, Box<dyn std::error::Error>> {
        if face.is_empty() {
            return Err("cannot encode an empty face box".into());
        }
        let tensor = preprocess(frame, face);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding = outputs[0].try_extract_array::<f32>()?;
        let values = embedding
            .as_slice()
            .ok_or("Cannot get embedding slice")?
            .to_vec();
        if values.len() != EMBEDDING_DIM {
            return Err(format!(
                "expected {EMBEDDING_DIM}-dim embedding, got {}",
                values.len()
            )
            .into());
        }
        Ok(FaceSignature::new(values))
    }
}

/// Square crop centred on the face box, in frame coordinates.
///
/// The side is the longer box edge; the crop may extend past the frame.
fn square_crop(face: &BoundingBox) -> (f64, f64, f64) {
    let side = face.width().max(face.height()) as f64;
    let cx = (face.left + face.right) as f64 / 2.0;
    let cy = (face.top + face.bottom) as f64 / 2.0;
    (cx - side / 2.0, cy - side / 2.0, side)
}

/// Nearest-neighbour resample of the square crop to 112×112, normalized to
/// `[-1, 1]`, NCHW. Samples outside the frame clamp to the nearest edge.
fn preprocess(frame: &Frame, face: &BoundingBox) -> ndarray::Array4<f32> {
    let (x0, y0, side) = square_crop(face);
    let src = frame.as_ndarray();
    let max_x = frame.width().saturating_sub(1) as f64;
    let max_y = frame.height().saturating_sub(1) as f64;
    let step = side / INPUT_SIZE as f64;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        let sy = (y0 + (y as f64 + 0.5) * step).clamp(0.0, max_y) as usize;
        for x in 0..INPUT_SIZE {
            let sx = (x0 + (x as f64 + 0.5) * step).clamp(0.0, max_x) as usize;
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[sy, sx, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }
    tensor
}
