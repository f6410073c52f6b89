use std::path::{Path, PathBuf};

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::recognition::domain::found_names::FoundNames;
use crate::recognition::domain::frame_matcher::FrameMatcher;
use crate::recognition::domain::reference_loader::ReferenceLoader;
use crate::shared::error::{to_send, RecognitionError};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::frame_sink::VideoWriterSink;
use super::recognition_pipeline::{
    FoundNamesCallback, PipelineConfig, PipelineStats, ProgressCallback, RecognitionPipeline,
};
use super::staged_output::StagedOutput;

/// Video-file recognition: every frame is matched, annotated and re-encoded
/// at the source's frame rate and size.
///
/// Output goes to a temporary sibling of `output_path` and is moved into
/// place only after the encoder is finalized.
pub struct RecognizeVideoUseCase {
    reader: Box<dyn VideoReader>,
    writer: Box<dyn VideoWriter>,
    loader: ReferenceLoader,
    matcher: FrameMatcher,
    annotator: Box<dyn FrameAnnotator>,
    on_progress: Option<ProgressCallback>,
    on_found_names: Option<FoundNamesCallback>,
}

impl RecognizeVideoUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        loader: ReferenceLoader,
        matcher: FrameMatcher,
        annotator: Box<dyn FrameAnnotator>,
    ) -> Self {
        Self {
            reader,
            writer,
            loader,
            matcher,
            annotator,
            on_progress: None,
            on_found_names: None,
        }
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn on_found_names(mut self, callback: FoundNamesCallback) -> Self {
        self.on_found_names = Some(callback);
        self
    }

    pub fn execute(
        &mut self,
        input_path: &Path,
        reference_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<FoundNames, RecognitionError> {
        if reference_paths.is_empty() {
            return Err(RecognitionError::NoReferencePaths);
        }

        let metadata = self
            .reader
            .open(input_path)
            .map_err(|e| RecognitionError::input(input_path, e))?;
        let result = self.encode(&metadata, reference_paths, output_path);
        self.reader.close();

        let stats = result?;
        log::info!(
            "Processed {}/{} frames, found {} known people",
            stats.frames_processed,
            metadata.total_frames,
            stats.found_names.len()
        );
        Ok(stats.found_names)
    }

    fn encode(
        &mut self,
        metadata: &VideoMetadata,
        reference_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<PipelineStats, RecognitionError> {
        let stage = StagedOutput::new(output_path)
            .map_err(|e| RecognitionError::output(output_path, Box::new(e)))?;
        self.writer
            .open(stage.temp_path(), metadata)
            .map_err(|e| RecognitionError::output(output_path, e))?;

        let stats = self.process(metadata, reference_paths);
        // Finalize even on failure so the encoder releases the temp file
        let closed = self.writer.close();
        let stats = stats?;
        closed.map_err(|e| RecognitionError::Write(to_send(e)))?;

        stage
            .commit()
            .map_err(|e| RecognitionError::output(output_path, Box::new(e)))?;
        Ok(stats)
    }

    fn process(
        &mut self,
        metadata: &VideoMetadata,
        reference_paths: &[PathBuf],
    ) -> Result<PipelineStats, RecognitionError> {
        let references = self
            .loader
            .load(reference_paths, self.matcher.analyzer_mut())?;

        let mut config = PipelineConfig {
            on_progress: self.on_progress.take(),
            on_found_names: self.on_found_names.take(),
            ..PipelineConfig::default()
        };
        let mut sink = VideoWriterSink::new(self.writer.as_mut());
        let stats = RecognitionPipeline::new(&mut self.matcher, self.annotator.as_ref(), &references)
            .run(self.reader.as_mut(), metadata, &mut sink, &mut config);

        self.on_progress = config.on_progress;
        self.on_found_names = config.on_found_names;
        stats
    }
}
