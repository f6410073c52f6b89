use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::recognition::domain::frame_matcher::FrameMatcher;
use crate::recognition::domain::reference_loader::ReferenceLoader;
use crate::recognition::domain::reference_set::ReferenceSet;
use crate::shared::constants::{
    LIVE_DECIMATION, LIVE_DEVICE_INDEX, LIVE_DOWNSCALE, LIVE_JPEG_QUALITY,
};
use crate::shared::error::RecognitionError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::ffmpeg_camera_reader::FfmpegCameraReader;

use super::frame_sink::{EncodedFrameSink, FrameCallback};
use super::recognition_pipeline::{PipelineConfig, PipelineStats, RecognitionPipeline};

/// Settings for a live camera session.
#[derive(Clone, Debug)]
pub struct LiveStreamOptions {
    /// Device name as the camera reader expects it.
    pub device: PathBuf,
    pub decimation: usize,
    pub downscale: u32,
    pub jpeg_quality: u8,
    /// Raised by the caller (or [`LiveSession::stop`]) to end the stream.
    pub cancelled: Arc<AtomicBool>,
}

impl Default for LiveStreamOptions {
    fn default() -> Self {
        Self::for_device(LIVE_DEVICE_INDEX)
    }
}

impl LiveStreamOptions {
    pub fn for_device(index: u32) -> Self {
        Self {
            device: FfmpegCameraReader::device_path(index),
            decimation: LIVE_DECIMATION,
            downscale: LIVE_DOWNSCALE,
            jpeg_quality: LIVE_JPEG_QUALITY,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Live camera recognition on a dedicated worker thread.
///
/// `start` opens the device and loads the references on the caller's thread,
/// so setup failures are returned directly. Streaming then moves to the
/// worker, which delivers annotated frames through `on_frame` until it is
/// cancelled or the device stops producing frames. `start` consumes the use
/// case because its components move into the worker.
pub struct RecognizeLiveUseCase {
    camera: Box<dyn VideoReader>,
    loader: ReferenceLoader,
    matcher: FrameMatcher,
    annotator: Box<dyn FrameAnnotator>,
    image_writer: Box<dyn ImageWriter>,
    options: LiveStreamOptions,
}

impl RecognizeLiveUseCase {
    pub fn new(
        camera: Box<dyn VideoReader>,
        loader: ReferenceLoader,
        matcher: FrameMatcher,
        annotator: Box<dyn FrameAnnotator>,
        image_writer: Box<dyn ImageWriter>,
        options: LiveStreamOptions,
    ) -> Self {
        Self {
            camera,
            loader,
            matcher: matcher.with_downscale(options.downscale),
            annotator,
            image_writer,
            options,
        }
    }

    pub fn start(
        mut self,
        reference_paths: &[PathBuf],
        on_frame: FrameCallback,
    ) -> Result<LiveSession, RecognitionError> {
        if reference_paths.is_empty() {
            return Err(RecognitionError::NoReferencePaths);
        }

        let device = &self.options.device;
        let metadata = self
            .camera
            .open(device)
            .map_err(|e| RecognitionError::input(device, e))?;
        let references = match self
            .loader
            .load(reference_paths, self.matcher.analyzer_mut())
        {
            Ok(references) => references,
            Err(e) => {
                self.camera.close();
                return Err(e);
            }
        };

        let worker = Worker {
            camera: self.camera,
            matcher: self.matcher,
            annotator: self.annotator,
            image_writer: self.image_writer,
            references,
            metadata,
            decimation: self.options.decimation,
            jpeg_quality: self.options.jpeg_quality,
            cancelled: self.options.cancelled.clone(),
        };
        let handle = std::thread::Builder::new()
            .name("live-recognition".to_string())
            .spawn(move || worker.run(on_frame))
            .map_err(|e| RecognitionError::Write(Box::new(e)))?;

        Ok(LiveSession {
            cancelled: self.options.cancelled.clone(),
            handle: Some(handle),
        })
    }
}

struct Worker {
    camera: Box<dyn VideoReader>,
    matcher: FrameMatcher,
    annotator: Box<dyn FrameAnnotator>,
    image_writer: Box<dyn ImageWriter>,
    references: ReferenceSet,
    metadata: VideoMetadata,
    decimation: usize,
    jpeg_quality: u8,
    cancelled: Arc<AtomicBool>,
}

impl Worker {
    fn run(mut self, on_frame: FrameCallback) -> Result<PipelineStats, RecognitionError> {
        let mut sink = EncodedFrameSink::new(self.image_writer.as_ref(), on_frame)
            .with_quality(self.jpeg_quality);
        let mut config = PipelineConfig {
            decimation: self.decimation,
            cancelled: self.cancelled.clone(),
            ..PipelineConfig::default()
        };
        let result = RecognitionPipeline::new(
            &mut self.matcher,
            self.annotator.as_ref(),
            &self.references,
        )
        .run(self.camera.as_mut(), &self.metadata, &mut sink, &mut config);

        self.camera.close();
        if let Ok(stats) = &result {
            log::info!(
                "Live stream ended: {} frames read, {} processed",
                stats.frames_read,
                stats.frames_processed
            );
        }
        result
    }
}

/// Handle to a running live stream.
///
/// Dropping the handle without joining raises the stop flag; the worker
/// finishes its current frame and releases the device on its own.
pub struct LiveSession {
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<Result<PipelineStats, RecognitionError>>>,
}

impl LiveSession {
    /// Asks the worker to stop before its next frame.
    pub fn stop(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Waits for the worker and returns what it saw.
    pub fn join(mut self) -> Result<PipelineStats, RecognitionError> {
        let handle = self.handle.take().ok_or(RecognitionError::AlreadyExecuted)?;
        handle.join().map_err(|_| RecognitionError::WorkerPanicked)?
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}
