use std::path::{Path, PathBuf};

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::recognition::domain::frame_matcher::FrameMatcher;
use crate::recognition::domain::match_result::MatchResult;
use crate::recognition::domain::reference_loader::ReferenceLoader;
use crate::shared::error::RecognitionError;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

use super::frame_sink::ImageFileSink;
use super::recognition_pipeline::{PipelineConfig, RecognitionPipeline};
use super::staged_output::StagedOutput;

/// Still-image recognition: read target → load references → match →
/// annotate → write.
pub struct RecognizeImageUseCase {
    reader: Box<dyn VideoReader>,
    loader: ReferenceLoader,
    matcher: FrameMatcher,
    annotator: Box<dyn FrameAnnotator>,
    image_writer: Box<dyn ImageWriter>,
}

impl RecognizeImageUseCase {
    pub fn new(
        reader: Box<dyn VideoReader>,
        loader: ReferenceLoader,
        matcher: FrameMatcher,
        annotator: Box<dyn FrameAnnotator>,
        image_writer: Box<dyn ImageWriter>,
    ) -> Self {
        Self {
            reader,
            loader,
            matcher,
            annotator,
            image_writer,
        }
    }

    /// Returns the faces found in the target, in detection order. Nothing is
    /// written to `output_path` unless every step succeeds.
    pub fn execute(
        &mut self,
        target_path: &Path,
        reference_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<Vec<MatchResult>, RecognitionError> {
        if reference_paths.is_empty() {
            return Err(RecognitionError::NoReferencePaths);
        }

        let metadata = self
            .reader
            .open(target_path)
            .map_err(|e| RecognitionError::input(target_path, e))?;
        let result = self.recognize(&metadata, reference_paths, output_path);
        self.reader.close();
        result
    }

    fn recognize(
        &mut self,
        metadata: &VideoMetadata,
        reference_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<Vec<MatchResult>, RecognitionError> {
        let references = self
            .loader
            .load(reference_paths, self.matcher.analyzer_mut())?;

        let stage = StagedOutput::new(output_path)
            .map_err(|e| RecognitionError::output(output_path, Box::new(e)))?;
        let mut sink = ImageFileSink::new(self.image_writer.as_ref(), stage.temp_path().to_path_buf());

        let stats = RecognitionPipeline::new(&mut self.matcher, self.annotator.as_ref(), &references)
            .run(
                self.reader.as_mut(),
                metadata,
                &mut sink,
                &mut PipelineConfig::default(),
            )?;
        if stats.frames_processed == 0 {
            return Err(RecognitionError::input(
                metadata.source_path.clone().unwrap_or_default(),
                "image could not be decoded".into(),
            ));
        }

        stage
            .commit()
            .map_err(|e| RecognitionError::output(output_path, Box::new(e)))?;
        log::info!(
            "Recognized {} faces, wrote {}",
            stats.last_results.len(),
            output_path.display()
        );
        Ok(stats.last_results)
    }
}
