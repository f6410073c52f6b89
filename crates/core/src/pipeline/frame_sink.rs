use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::shared::constants::LIVE_JPEG_QUALITY;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_writer::VideoWriter;

/// Receives annotated frames in processing order.
pub trait FrameSink {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}

/// Callback for live frames: base64 (standard alphabet) of a JPEG image.
pub type FrameCallback = Box<dyn FnMut(String) + Send>;

/// Appends frames to an opened [`VideoWriter`]. Opening and closing stay
/// with the caller.
pub struct VideoWriterSink<'a> {
    writer: &'a mut dyn VideoWriter,
}

impl<'a> VideoWriterSink<'a> {
    pub fn new(writer: &'a mut dyn VideoWriter) -> Self {
        Self { writer }
    }
}

impl FrameSink for VideoWriterSink<'_> {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.writer.write(frame)
    }
}

/// Saves the frame it receives to a fixed path.
pub struct ImageFileSink<'a> {
    writer: &'a dyn ImageWriter,
    path: PathBuf,
}

impl<'a> ImageFileSink<'a> {
    pub fn new(writer: &'a dyn ImageWriter, path: PathBuf) -> Self {
        Self { writer, path }
    }
}

impl FrameSink for ImageFileSink<'_> {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.writer.write(&self.path, frame)
    }
}

/// JPEG-encodes each frame, base64s it and hands it to a callback.
pub struct EncodedFrameSink<'a> {
    writer: &'a dyn ImageWriter,
    quality: u8,
    on_frame: FrameCallback,
}

impl<'a> EncodedFrameSink<'a> {
    pub fn new(writer: &'a dyn ImageWriter, on_frame: FrameCallback) -> Self {
        Self {
            writer,
            quality: LIVE_JPEG_QUALITY,
            on_frame,
        }
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }
}

impl FrameSink for EncodedFrameSink<'_> {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let jpeg = self.writer.encode_jpeg(frame, self.quality)?;
        (self.on_frame)(STANDARD.encode(jpeg));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{tagged_frame, RecordingImageWriter, RecordingWriter};
    use crate::video::infrastructure::image_file_writer::ImageFileWriter;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_video_writer_sink_forwards_frames() {
        let mut writer = RecordingWriter::new();
        let frames = writer.frames.clone();
        {
            let mut sink = VideoWriterSink::new(&mut writer);
            sink.accept(&tagged_frame(1, 4, 4, 0)).unwrap();
            sink.accept(&tagged_frame(2, 4, 4, 1)).unwrap();
        }
        let written = frames.lock().unwrap();
        assert_eq!(written.iter().map(|f| f.index()).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_image_file_sink_writes_to_its_path() {
        let writer = RecordingImageWriter::new();
        let mut sink = ImageFileSink::new(&writer, PathBuf::from("/out/result.png"));
        sink.accept(&tagged_frame(7, 4, 4, 0)).unwrap();

        let written = writer.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("/out/result.png"));
    }

    #[test]
    fn test_encoded_sink_emits_base64_of_jpeg_bytes() {
        let writer = RecordingImageWriter::new();
        let got = Arc::new(Mutex::new(Vec::new()));
        let got_cb = got.clone();
        let mut sink = EncodedFrameSink::new(
            &writer,
            Box::new(move |s| got_cb.lock().unwrap().push(s)),
        );

        sink.accept(&tagged_frame(9, 4, 4, 3)).unwrap();
        let emitted = got.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(STANDARD.decode(&emitted[0]).unwrap(), vec![3, 9]);
    }

    #[test]
    fn test_encoded_sink_real_jpeg_roundtrip() {
        let writer = ImageFileWriter::new();
        let got = Arc::new(Mutex::new(None));
        let got_cb = got.clone();
        let mut sink = EncodedFrameSink::new(
            &writer,
            Box::new(move |s| *got_cb.lock().unwrap() = Some(s)),
        )
        .with_quality(90);

        sink.accept(&tagged_frame(120, 64, 48, 0)).unwrap();
        let encoded = got.lock().unwrap().take().unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (64, 48));
    }
}
