use serde::Serialize;

/// Face box in pixel coordinates of one specific frame.
///
/// Edges follow the (top, right, bottom, left) convention; `right` and
/// `bottom` are exclusive. Boxes from frames of different resolution are not
/// comparable until rescaled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl BoundingBox {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a box from float `(x1, y1)`–`(x2, y2)` corners, rounded and
    /// clamped to the frame.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64, frame_w: u32, frame_h: u32) -> Self {
        let clamp_x = |v: f64| v.round().clamp(0.0, frame_w as f64) as i32;
        let clamp_y = |v: f64| v.round().clamp(0.0, frame_h as f64) as i32;
        Self {
            top: clamp_y(y1),
            right: clamp_x(x2),
            bottom: clamp_y(y2),
            left: clamp_x(x1),
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Maps a box found on a downscaled frame back onto the full frame.
    pub fn scaled(&self, factor: u32) -> Self {
        let f = factor as i32;
        Self {
            top: self.top * f,
            right: self.right * f,
            bottom: self.bottom * f,
            left: self.left * f,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_dimensions() {
        let b = BoundingBox::new(10, 60, 40, 20);
        assert_eq!(b.width(), 40);
        assert_eq!(b.height(), 30);
        assert!(!b.is_empty());
    }

    #[test]
    fn test_inverted_box_is_empty() {
        let b = BoundingBox::new(40, 10, 10, 60);
        assert_eq!(b.width(), 0);
        assert_eq!(b.height(), 0);
        assert!(b.is_empty());
    }

    #[rstest]
    #[case::identity(1, BoundingBox::new(5, 30, 25, 10))]
    #[case::double(2, BoundingBox::new(10, 60, 50, 20))]
    #[case::quadruple(4, BoundingBox::new(20, 120, 100, 40))]
    fn test_scaled(#[case] factor: u32, #[case] expected: BoundingBox) {
        let b = BoundingBox::new(5, 30, 25, 10);
        assert_eq!(b.scaled(factor), expected);
    }

    #[test]
    fn test_from_corners_clamps_to_frame() {
        let b = BoundingBox::from_corners(-12.4, -3.0, 130.7, 95.2, 100, 80);
        assert_eq!(b, BoundingBox::new(0, 100, 80, 0));
    }

    #[test]
    fn test_from_corners_rounds() {
        let b = BoundingBox::from_corners(10.4, 20.6, 50.5, 60.49, 200, 200);
        assert_eq!(b.left, 10);
        assert_eq!(b.top, 21);
        assert_eq!(b.right, 51);
        assert_eq!(b.bottom, 60);
    }
}
