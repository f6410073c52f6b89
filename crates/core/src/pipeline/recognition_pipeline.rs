use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::recognition::domain::found_names::FoundNames;
use crate::recognition::domain::frame_matcher::FrameMatcher;
use crate::recognition::domain::match_result::MatchResult;
use crate::recognition::domain::reference_set::ReferenceSet;
use crate::shared::error::{to_send, RecognitionError};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

use super::frame_sink::FrameSink;

/// Fraction of the source processed so far, in `0.0..=1.0`.
pub type ProgressCallback = Box<dyn FnMut(f64) + Send>;

/// Called with the accumulated names after every processed frame.
pub type FoundNamesCallback = Box<dyn FnMut(&FoundNames) + Send>;

/// Per-run knobs for [`RecognitionPipeline::run`].
pub struct PipelineConfig {
    /// Process one frame in `decimation`, the last of each group; the rest
    /// are dropped unseen.
    pub decimation: usize,
    pub cancelled: Arc<AtomicBool>,
    pub on_progress: Option<ProgressCallback>,
    pub on_found_names: Option<FoundNamesCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            decimation: 1,
            cancelled: Arc::new(AtomicBool::new(false)),
            on_progress: None,
            on_found_names: None,
        }
    }
}

/// What a finished run saw.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PipelineStats {
    pub frames_read: usize,
    pub frames_processed: usize,
    pub found_names: FoundNames,
    /// Results of the most recently processed frame.
    pub last_results: Vec<MatchResult>,
    pub cancelled: bool,
}

/// The read → match → annotate → emit loop shared by every source.
///
/// Frames are handled one at a time in arrival order. The cancellation flag
/// is checked before each read. A reader error ends the stream; it is logged
/// and the run still succeeds with what was processed.
pub struct RecognitionPipeline<'a> {
    matcher: &'a mut FrameMatcher,
    annotator: &'a dyn FrameAnnotator,
    references: &'a ReferenceSet,
}

impl<'a> RecognitionPipeline<'a> {
    pub fn new(
        matcher: &'a mut FrameMatcher,
        annotator: &'a dyn FrameAnnotator,
        references: &'a ReferenceSet,
    ) -> Self {
        Self {
            matcher,
            annotator,
            references,
        }
    }

    pub fn run(
        &mut self,
        reader: &mut dyn VideoReader,
        metadata: &VideoMetadata,
        sink: &mut dyn FrameSink,
        config: &mut PipelineConfig,
    ) -> Result<PipelineStats, RecognitionError> {
        let decimation = config.decimation.max(1);
        let mut stats = PipelineStats::default();
        let mut frames = reader.frames();

        loop {
            if config.cancelled.load(Ordering::Relaxed) {
                log::debug!("Cancelled after {} frames", stats.frames_read);
                stats.cancelled = true;
                break;
            }

            let mut frame = match frames.next() {
                None => break,
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    log::warn!(
                        "Read failed after {} frames, treating as end of stream: {e}",
                        stats.frames_read
                    );
                    break;
                }
            };
            let position = stats.frames_read;
            stats.frames_read += 1;
            if position % decimation != decimation - 1 {
                continue;
            }

            let results = self
                .matcher
                .match_frame(&frame, self.references)
                .map_err(|e| RecognitionError::Analysis(to_send(e)))?;
            self.annotator
                .annotate(&mut frame, &results)
                .map_err(|e| RecognitionError::Annotation(to_send(e)))?;
            sink.accept(&frame)
                .map_err(|e| RecognitionError::Write(to_send(e)))?;

            stats.frames_processed += 1;
            stats.found_names.record(&results);
            stats.last_results = results;

            if let Some(cb) = config.on_progress.as_mut() {
                if let Some(fraction) = metadata.progress(stats.frames_read) {
                    cb(fraction);
                }
            }
            if let Some(cb) = config.on_found_names.as_mut() {
                cb(&stats.found_names);
            }
        }

        Ok(stats)
    }
}
