use std::path::{Path, PathBuf};

use crate::shared::constants::{LIVE_FRAME_HEIGHT, LIVE_FRAME_WIDTH};
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::ffmpeg_decoder::DecodeSession;

#[cfg(target_os = "linux")]
const CAPTURE_FORMAT: &str = "v4l2";
#[cfg(target_os = "macos")]
const CAPTURE_FORMAT: &str = "avfoundation";
#[cfg(target_os = "windows")]
const CAPTURE_FORMAT: &str = "vfwcap";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const CAPTURE_FORMAT: &str = "v4l2";

/// Reads frames from a capture device through libavdevice.
///
/// The device is asked for `width`x`height`; drivers that cannot honour the
/// request fall back to their native size, which is what the metadata reports.
pub struct FfmpegCameraReader {
    width: u32,
    height: u32,
    session: Option<DecodeSession>,
}

// Safety: FfmpegCameraReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCameraReader {}

impl FfmpegCameraReader {
    pub fn new() -> Self {
        Self::with_size(LIVE_FRAME_WIDTH, LIVE_FRAME_HEIGHT)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            session: None,
        }
    }

    /// Platform device name for capture device `index`.
    ///
    /// - Linux: `/dev/video<index>`
    /// - macOS, Windows: the bare index
    pub fn device_path(index: u32) -> PathBuf {
        if cfg!(target_os = "linux") {
            PathBuf::from(format!("/dev/video{index}"))
        } else {
            PathBuf::from(index.to_string())
        }
    }

    fn options(&self) -> ffmpeg_next::Dictionary<'static> {
        let mut options = ffmpeg_next::Dictionary::new();
        options.set("video_size", &format!("{}x{}", self.width, self.height));
        options
    }
}

impl Default for FfmpegCameraReader {
    fn default() -> Self {
        Self::new()
    }
}

fn capture_format() -> Result<ffmpeg_next::format::format::Input, Box<dyn std::error::Error>> {
    ffmpeg_next::device::input::video()
        .find(|f| f.name() == CAPTURE_FORMAT)
        .ok_or_else(|| format!("capture backend '{CAPTURE_FORMAT}' not available").into())
}

impl VideoReader for FfmpegCameraReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let format = ffmpeg_next::format::format::Format::Input(capture_format()?);
        let ictx = match ffmpeg_next::format::open_with(path, &format, self.options())? {
            ffmpeg_next::format::context::Context::Input(ictx) => ictx,
            ffmpeg_next::format::context::Context::Output(_) => {
                return Err("capture device opened as output".into())
            }
        };
        let session = DecodeSession::new(ictx)?;
        log::info!(
            "Opened capture device {} at {}x{}",
            path.display(),
            session.width(),
            session.height()
        );

        let metadata = VideoMetadata {
            width: session.width(),
            height: session.height(),
            fps: session.fps(),
            frame_rate: session.frame_rate(),
            total_frames: 0,
            codec: session.codec().to_string(),
            source_path: None,
        };
        self.session = Some(session);
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.session.as_mut() {
            Some(session) => Box::new(session.frames()),
            None => Box::new(std::iter::once(Err(
                "FfmpegCameraReader: not opened".into()
            ))),
        }
    }

    fn close(&mut self) {
        if self.session.take().is_some() {
            log::debug!("Released capture device");
        }
    }
}
