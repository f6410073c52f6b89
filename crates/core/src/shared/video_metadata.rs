use std::path::PathBuf;

/// Stream properties reported by a reader when a source is opened.
///
/// Still images are a single-frame source with `fps = 0`. Live sources report
/// `total_frames = 0` because their length is unknown.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Exact frame rate as `(numerator, denominator)` when the container
    /// reports one, e.g. `(30000, 1001)` for NTSC.
    pub frame_rate: Option<(i32, i32)>,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Frame rate for the encoder as `(numerator, denominator)`.
    ///
    /// Uses the exact container rate when known, otherwise a fraction close to
    /// `fps`, falling back to 30/1 when the source reported no rate at all.
    pub fn encoder_frame_rate(&self) -> (i32, i32) {
        if let Some((num, den)) = self.frame_rate {
            if num > 0 && den > 0 {
                return reduce(num, den);
            }
        }
        if !(self.fps.is_finite() && self.fps >= 0.001) {
            return (30, 1);
        }
        fraction_near(self.fps)
    }

    /// Fraction of the source covered after `processed` frames, or `None`
    /// when the length is unknown.
    pub fn progress(&self, processed: usize) -> Option<f64> {
        if self.total_frames == 0 {
            return None;
        }
        Some((processed as f64 / self.total_frames as f64).min(1.0))
    }
}

/// Integral rates stay integral, NTSC-style rates become `n/1001`, anything
/// else is kept to a thousandth.
fn fraction_near(fps: f64) -> (i32, i32) {
    let whole = fps.round();
    if (fps - whole).abs() < 1e-3 {
        return (whole as i32, 1);
    }
    let ntsc = (fps * 1001.0).round();
    if (ntsc / 1001.0 - fps).abs() < 1e-6 {
        return reduce(ntsc as i32, 1001);
    }
    reduce((fps * 1000.0).round() as i32, 1000)
}

fn reduce(num: i32, den: i32) -> (i32, i32) {
    let (mut a, mut b) = (num, den);
    while b != 0 {
        (a, b) = (b, a % b);
    }
    (num / a, den / a)
}
