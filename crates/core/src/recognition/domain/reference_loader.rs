use std::path::PathBuf;

use crate::recognition::domain::face_analyzer::FaceAnalyzer;
use crate::recognition::domain::reference_set::{name_from_path, ReferenceEntry, ReferenceSet};
use crate::shared::error::{to_send, RecognitionError};
use crate::video::domain::video_reader::VideoReader;

/// Turns reference photos into a [`ReferenceSet`].
///
/// Each image contributes the first face the analyzer reports, named after
/// the file. Images without a face are skipped; an image that cannot be read
/// aborts the load.
pub struct ReferenceLoader {
    reader: Box<dyn VideoReader>,
}

impl ReferenceLoader {
    pub fn new(reader: Box<dyn VideoReader>) -> Self {
        Self { reader }
    }

    pub fn load(
        &mut self,
        paths: &[PathBuf],
        analyzer: &mut dyn FaceAnalyzer,
    ) -> Result<ReferenceSet, RecognitionError> {
        if paths.is_empty() {
            return Err(RecognitionError::NoReferencePaths);
        }

        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let opened = self.reader.open(path);
            let frame = opened.and_then(|_| {
                self.reader
                    .frames()
                    .next()
                    .ok_or_else(|| "image has no frames".into())
                    .and_then(|f| f)
            });
            self.reader.close();
            let frame = frame.map_err(|e| RecognitionError::input(path, e))?;

            let faces = analyzer
                .analyze(&frame)
                .map_err(|e| RecognitionError::Analysis(to_send(e)))?;
            match faces.into_iter().next() {
                Some(face) => entries.push(ReferenceEntry {
                    name: name_from_path(path),
                    signature: face.signature,
                }),
                None => log::debug!("No face in reference image {}, skipping", path.display()),
            }
        }

        if entries.is_empty() {
            return Err(RecognitionError::NoUsableReferences {
                attempted: paths.len(),
            });
        }
        log::info!(
            "Loaded {} reference faces from {} images",
            entries.len(),
            paths.len()
        );
        Ok(ReferenceSet::new(entries))
    }
}
