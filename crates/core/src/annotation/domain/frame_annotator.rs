use crate::recognition::domain::match_result::MatchResult;
use crate::shared::frame::Frame;

/// Draws match results onto a frame in place.
///
/// An empty result list must leave the frame untouched.
pub trait FrameAnnotator: Send {
    fn annotate(
        &self,
        frame: &mut Frame,
        results: &[MatchResult],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
