//! Stubs for the domain traits, shared by the unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::encoding::domain::face_signature::FaceSignature;
use crate::recognition::domain::face_analyzer::{FaceAnalyzer, FaceObservation};
use crate::recognition::domain::match_result::MatchResult;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

/// Identity "A", "B", "C": orthogonal unit signatures.
pub fn face_a() -> FaceSignature {
    FaceSignature::new(vec![1.0, 0.0, 0.0])
}

pub fn face_b() -> FaceSignature {
    FaceSignature::new(vec![0.0, 1.0, 0.0])
}

pub fn face_c() -> FaceSignature {
    FaceSignature::new(vec![0.0, 0.0, 1.0])
}

pub fn observation(bbox: BoundingBox, signature: FaceSignature) -> FaceObservation {
    FaceObservation { bbox, signature }
}

/// Solid frame whose every byte is `tag`; the scripted analyzer keys on it.
pub fn tagged_frame(tag: u8, width: u32, height: u32, index: usize) -> Frame {
    Frame::new(vec![tag; (width * height * 3) as usize], width, height, 3, index)
}

pub fn metadata(width: u32, height: u32, total_frames: usize) -> VideoMetadata {
    VideoMetadata {
        width,
        height,
        fps: 25.0,
        frame_rate: Some((25, 1)),
        total_frames,
        codec: "stub".to_string(),
        source_path: None,
    }
}

/// Returns pre-scripted faces per frame tag and records every frame size it
/// was asked to analyze.
#[derive(Default)]
pub struct ScriptedAnalyzer {
    faces: HashMap<u8, Vec<FaceObservation>>,
    fail_on: Option<u8>,
    pub seen: Arc<Mutex<Vec<(usize, u32, u32)>>>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: u8, faces: Vec<FaceObservation>) -> Self {
        self.faces.insert(tag, faces);
        self
    }

    pub fn failing_on(mut self, tag: u8) -> Self {
        self.fail_on = Some(tag);
        self
    }
}

impl FaceAnalyzer for ScriptedAnalyzer {
    fn analyze(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>> {
        let tag = frame.data().first().copied().unwrap_or(0);
        self.seen
            .lock()
            .unwrap()
            .push((frame.index(), frame.width(), frame.height()));
        if self.fail_on == Some(tag) {
            return Err("analysis exploded".into());
        }
        Ok(self.faces.get(&tag).cloned().unwrap_or_default())
    }
}

/// Serves a fixed list of frames. `paths` maps an opened path to the frames
/// it yields; unknown paths fail to open.
#[derive(Default)]
pub struct StubReader {
    sources: HashMap<PathBuf, (VideoMetadata, Vec<Frame>)>,
    current: Vec<Frame>,
    fail_at: Option<usize>,
    pub opened: Arc<Mutex<Vec<PathBuf>>>,
    pub closed: Arc<AtomicUsize>,
    pub open_now: Arc<AtomicBool>,
}

impl StubReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, path: impl Into<PathBuf>, meta: VideoMetadata, frames: Vec<Frame>) -> Self {
        self.sources.insert(path.into(), (meta, frames));
        self
    }

    pub fn with_image(self, path: impl Into<PathBuf>, frame: Frame) -> Self {
        let mut meta = metadata(frame.width(), frame.height(), 1);
        meta.fps = 0.0;
        meta.frame_rate = None;
        self.with_source(path, meta, vec![frame])
    }

    /// Yields an `Err` instead of the frame at `index`.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl VideoReader for StubReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        let (meta, frames) = self
            .sources
            .get(path)
            .cloned()
            .ok_or_else(|| format!("no such file: {}", path.display()))?;
        self.current = frames;
        self.open_now.store(true, Ordering::SeqCst);
        Ok(meta)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let fail_at = self.fail_at;
        Box::new(self.current.drain(..).map(move |f| {
            if Some(f.index()) == fail_at {
                Err("device unplugged".into())
            } else {
                Ok(f)
            }
        }))
    }

    fn close(&mut self) {
        self.current.clear();
        self.open_now.store(false, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collects written frames in memory.
#[derive(Default)]
pub struct RecordingWriter {
    pub frames: Arc<Mutex<Vec<Frame>>>,
    pub opened_at: Arc<Mutex<Option<(PathBuf, VideoMetadata)>>>,
    pub closed: Arc<AtomicBool>,
    fail_open: bool,
    fail_write_at: Option<usize>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn failing_write_at(mut self, index: usize) -> Self {
        self.fail_write_at = Some(index);
        self
    }
}

impl VideoWriter for RecordingWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if self.fail_open {
            return Err("read-only file system".into());
        }
        std::fs::write(path, b"partial")?;
        *self.opened_at.lock().unwrap() = Some((path.to_path_buf(), metadata.clone()));
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if Some(frame.index()) == self.fail_write_at {
            return Err("disk full".into());
        }
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Records writes and hands out a fake JPEG payload (`[index, tag]`).
#[derive(Default)]
pub struct RecordingImageWriter {
    pub written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
}

impl RecordingImageWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageWriter for RecordingImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.written
            .lock()
            .unwrap()
            .push((path.to_path_buf(), frame.clone()));
        Ok(())
    }

    fn encode_jpeg(&self, frame: &Frame, _quality: u8) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(vec![frame.index() as u8, frame.data()[0]])
    }
}

/// Records the results it is asked to draw and marks annotated frames by
/// overwriting their last byte with 0xAA.
#[derive(Default)]
pub struct RecordingAnnotator {
    pub calls: Arc<Mutex<Vec<(usize, Vec<MatchResult>)>>>,
}

impl RecordingAnnotator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameAnnotator for RecordingAnnotator {
    fn annotate(
        &self,
        frame: &mut Frame,
        results: &[MatchResult],
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.calls
            .lock()
            .unwrap()
            .push((frame.index(), results.to_vec()));
        if !results.is_empty() {
            if let Some(last) = frame.data_mut().last_mut() {
                *last = 0xAA;
            }
        }
        Ok(())
    }
}
