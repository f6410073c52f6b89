use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes and encodes RGB frames with the `image` crate.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        frame.to_rgb_image()?.save(path)?;
        Ok(())
    }

    fn encode_jpeg(&self, frame: &Frame, quality: u8) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("expected RGB frame, got {} channels", frame.channels()).into());
        }
        let mut buf = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut buf, quality).encode(
            frame.data(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )?;
        Ok(buf.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        Frame::new(rgb.repeat((width * height) as usize), width, height, 3, 0)
    }

    #[test]
    fn test_png_keeps_channel_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        ImageFileWriter::new()
            .write(&path, &solid(50, 40, [50, 100, 200]))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (50, 40));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_jpeg_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        ImageFileWriter::new()
            .write(&path, &solid(32, 32, [200, 10, 10]))
            .unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        let p = img.get_pixel(16, 16).0;
        assert!(p[0] > 150 && p[2] < 60, "red should stay red, got {p:?}");
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let result = ImageFileWriter::new().write(
            Path::new("/nonexistent/dir/out.png"),
            &solid(4, 4, [0, 0, 0]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_encode_jpeg_produces_decodable_bytes() {
        let bytes = ImageFileWriter::new()
            .encode_jpeg(&solid(64, 48, [90, 90, 90]), 80)
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }

    #[test]
    fn test_encode_jpeg_rejects_non_rgb() {
        let gray = Frame::new(vec![0u8; 16], 4, 4, 1, 0);
        assert!(ImageFileWriter::new().encode_jpeg(&gray, 80).is_err());
    }
}
