/// Identity vector for one face, as produced by a [`FaceEncoder`].
///
/// Signatures are L2-normalized at construction, so the distance between two
/// of them is the cosine distance `1 - a·b`, ranging over `[0, 2]`.
///
/// [`FaceEncoder`]: crate::encoding::domain::face_encoder::FaceEncoder
#[derive(Clone, Debug, PartialEq)]
pub struct FaceSignature {
    values: Vec<f32>,
}

impl FaceSignature {
    pub fn new(mut values: Vec<f32>) -> Self {
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut values {
                *v /= norm;
            }
        }
        Self { values }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cosine distance to `other`. Signatures of different length never
    /// match and report the maximum distance.
    pub fn distance(&self, other: &FaceSignature) -> f64 {
        if self.values.len() != other.values.len() || self.values.is_empty() {
            return 2.0;
        }
        let dot: f64 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (*a as f64) * (*b as f64))
            .sum();
        (1.0 - dot).clamp(0.0, 2.0)
    }

    /// The match predicate: `distance <= tolerance`.
    pub fn matches(&self, other: &FaceSignature, tolerance: f64) -> bool {
        self.distance(other) <= tolerance
    }
}
