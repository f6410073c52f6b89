use image::{ImageBuffer, Rgb, RgbImage};
use ndarray::ArrayView3;

/// A single decoded video/image frame: contiguous RGB bytes in row-major order.
///
/// Channel order is RGB everywhere inside the crate; readers convert on the
/// way in and writers convert on the way out.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                self.channels as usize,
            ),
            &self.data,
        )
        .expect("Frame data length must match dimensions")
    }

    /// Borrows the pixel buffer as an `image` RGB view so drawing routines
    /// can mutate the frame in place.
    pub fn as_rgb_image_mut(
        &mut self,
    ) -> Result<ImageBuffer<Rgb<u8>, &mut [u8]>, Box<dyn std::error::Error>> {
        if self.channels != 3 {
            return Err(format!("expected an RGB frame, got {} channels", self.channels).into());
        }
        ImageBuffer::from_raw(self.width, self.height, self.data.as_mut_slice())
            .ok_or_else(|| "frame buffer does not match its dimensions".into())
    }

    pub fn to_rgb_image(&self) -> Result<RgbImage, Box<dyn std::error::Error>> {
        if self.channels != 3 {
            return Err(format!("expected an RGB frame, got {} channels", self.channels).into());
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| "frame buffer does not match its dimensions".into())
    }

    /// Returns a copy shrunk by an integer `factor` in both dimensions.
    ///
    /// The copy keeps this frame's index. A factor of 1 is a plain clone.
    pub fn downscaled(&self, factor: u32) -> Result<Frame, Box<dyn std::error::Error>> {
        if factor <= 1 {
            return Ok(self.clone());
        }
        let image = self.to_rgb_image()?;
        let w = (self.width / factor).max(1);
        let h = (self.height / factor).max(1);
        let small = image::imageops::resize(&image, w, h, image::imageops::FilterType::Triangle);
        Ok(Frame::from_rgb_image(small, self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3, 0);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        let mut data = vec![0u8; 12];
        data[6] = 255; // row=1, col=0, R
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_rgb_view_writes_through_to_frame() {
        let mut frame = Frame::new(vec![0u8; 12], 2, 2, 3, 0);
        {
            let mut view = frame.as_rgb_image_mut().unwrap();
            view.put_pixel(1, 1, Rgb([1, 2, 3]));
        }
        assert_eq!(&frame.data()[9..12], &[1, 2, 3]);
    }

    #[test]
    fn test_rgb_view_rejects_grayscale() {
        let mut frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        assert!(frame.as_rgb_image_mut().is_err());
        assert!(frame.to_rgb_image().is_err());
    }

    #[test]
    fn test_downscaled_halves_dimensions_and_keeps_index() {
        let frame = Frame::new(vec![90u8; 40 * 30 * 3], 40, 30, 3, 7);
        let small = frame.downscaled(2).unwrap();
        assert_eq!(small.width(), 20);
        assert_eq!(small.height(), 15);
        assert_eq!(small.index(), 7);
        assert!(small.data().iter().all(|&v| v == 90));
    }

    #[test]
    fn test_downscaled_by_one_is_identity() {
        let frame = Frame::new(vec![3u8; 12], 2, 2, 3, 1);
        assert_eq!(frame.downscaled(1).unwrap(), frame);
    }

    #[test]
    fn test_from_rgb_image_roundtrip() {
        let img = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let frame = Frame::from_rgb_image(img.clone(), 4);
        assert_eq!(frame.width(), 3);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.to_rgb_image().unwrap(), img);
    }
}
