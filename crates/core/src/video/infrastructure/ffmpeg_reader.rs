use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::ffmpeg_decoder::DecodeSession;

/// Decodes a video file via ffmpeg-next into RGB24 [`Frame`]s.
pub struct FfmpegReader {
    session: Option<DecodeSession>,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self { session: None }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let session = DecodeSession::new(ffmpeg_next::format::input(path)?)?;
        let metadata = VideoMetadata {
            width: session.width(),
            height: session.height(),
            fps: session.fps(),
            frame_rate: session.frame_rate(),
            total_frames: session.total_frames(),
            codec: session.codec().to_string(),
            source_path: Some(path.to_path_buf()),
        };
        log::debug!(
            "Opened {} ({}x{} @ {:.2} fps, {} frames)",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames
        );

        self.session = Some(session);
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.session.as_mut() {
            Some(session) => Box::new(session.frames()),
            None => Box::new(std::iter::once(Err("FfmpegReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.session = None;
    }
}
