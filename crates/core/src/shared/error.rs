use std::path::PathBuf;

use thiserror::Error;

/// Boxed error that can cross the live worker thread boundary.
pub type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the recognition use cases.
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("no reference images were given")]
    NoReferencePaths,

    #[error("no faces found in any of the {attempted} reference images")]
    NoUsableReferences { attempted: usize },

    #[error("cannot open input {}: {source}", path.display())]
    CannotOpenInput {
        path: PathBuf,
        #[source]
        source: SendError,
    },

    #[error("cannot open output {}: {source}", path.display())]
    CannotOpenOutput {
        path: PathBuf,
        #[source]
        source: SendError,
    },

    #[error("face analysis failed: {0}")]
    Analysis(#[source] SendError),

    #[error("annotation failed: {0}")]
    Annotation(#[source] SendError),

    #[error("failed to emit frame: {0}")]
    Write(#[source] SendError),

    #[error("use case already executed")]
    AlreadyExecuted,

    #[error("recognition worker panicked")]
    WorkerPanicked,
}

impl RecognitionError {
    pub fn input(path: impl Into<PathBuf>, source: Box<dyn std::error::Error>) -> Self {
        Self::CannotOpenInput {
            path: path.into(),
            source: to_send(source),
        }
    }

    pub fn output(path: impl Into<PathBuf>, source: Box<dyn std::error::Error>) -> Self {
        Self::CannotOpenOutput {
            path: path.into(),
            source: to_send(source),
        }
    }
}

/// A non-`Send` error captured as text, link by link, so it can cross
/// threads with its `source()` chain intact.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DetachedError {
    message: String,
    #[source]
    source: Option<Box<DetachedError>>,
}

impl DetachedError {
    fn capture(err: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            message: err.to_string(),
            source: err.source().map(|s| Box::new(Self::capture(s))),
        }
    }
}

/// Infrastructure traits return non-`Send` errors. The original error and
/// its causes are replaced by their messages; downcasting to the concrete
/// type is no longer possible.
pub fn to_send(err: Box<dyn std::error::Error>) -> SendError {
    Box::new(DetachedError::capture(err.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_usable_references_message() {
        let err = RecognitionError::NoUsableReferences { attempted: 3 };
        assert_eq!(
            err.to_string(),
            "no faces found in any of the 3 reference images"
        );
    }

    #[test]
    fn test_input_error_names_path_and_cause() {
        let err = RecognitionError::input("/videos/in.mp4", "No such file".into());
        assert_eq!(
            err.to_string(),
            "cannot open input /videos/in.mp4: No such file"
        );
    }

    #[test]
    fn test_output_error_keeps_source() {
        let err = RecognitionError::output("/out/x.mp4", "permission denied".into());
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "permission denied");
    }

    #[test]
    fn test_detached_error_keeps_source_chain() {
        let inner = RecognitionError::output("/out/x.mp4", "disk full".into());
        let outer = RecognitionError::input("/in.mp4", Box::new(inner));

        let first = std::error::Error::source(&outer).unwrap();
        assert_eq!(first.to_string(), "cannot open output /out/x.mp4: disk full");
        let second = first.source().unwrap();
        assert_eq!(second.to_string(), "disk full");
        assert!(second.source().is_none());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecognitionError>();
    }
}
