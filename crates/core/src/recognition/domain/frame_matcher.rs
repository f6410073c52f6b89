use crate::recognition::domain::face_analyzer::FaceAnalyzer;
use crate::recognition::domain::match_result::MatchResult;
use crate::recognition::domain::reference_set::ReferenceSet;
use crate::shared::constants::MATCH_TOLERANCE;
use crate::shared::frame::Frame;

/// Names every face in a frame against a [`ReferenceSet`].
///
/// Results come back in the analyzer's detection order. Each face takes the
/// first reference, in reference order, within `tolerance`; faces with no
/// such reference are "Unknown".
pub struct FrameMatcher {
    analyzer: Box<dyn FaceAnalyzer>,
    tolerance: f64,
    downscale: u32,
}

impl FrameMatcher {
    pub fn new(analyzer: Box<dyn FaceAnalyzer>) -> Self {
        Self {
            analyzer,
            tolerance: MATCH_TOLERANCE,
            downscale: 1,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Analyze a copy shrunk by `factor`, then map boxes back to the
    /// full-resolution frame.
    pub fn with_downscale(mut self, factor: u32) -> Self {
        self.downscale = factor.max(1);
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// The analyzer, for building the reference set with the same models.
    pub fn analyzer_mut(&mut self) -> &mut dyn FaceAnalyzer {
        self.analyzer.as_mut()
    }

    pub fn match_frame(
        &mut self,
        frame: &Frame,
        references: &ReferenceSet,
    ) -> Result<Vec<MatchResult>, Box<dyn std::error::Error>> {
        let observations = if self.downscale > 1 {
            self.analyzer.analyze(&frame.downscaled(self.downscale)?)?
        } else {
            self.analyzer.analyze(frame)?
        };

        Ok(observations
            .into_iter()
            .map(|face| {
                let bbox = face.bbox.scaled(self.downscale);
                match references.first_match(&face.signature, self.tolerance) {
                    Some(entry) => MatchResult::known(bbox, entry.name.clone()),
                    None => MatchResult::unknown(bbox),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::domain::face_signature::FaceSignature;
    use crate::recognition::domain::reference_set::ReferenceEntry;
    use crate::shared::bounding_box::BoundingBox;
    use crate::testing::*;

    fn refs(entries: &[(&str, FaceSignature)]) -> ReferenceSet {
        ReferenceSet::new(
            entries
                .iter()
                .map(|(name, sig)| ReferenceEntry {
                    name: name.to_string(),
                    signature: sig.clone(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_known_and_unknown_faces() {
        let box_a = BoundingBox::new(10, 60, 60, 10);
        let box_b = BoundingBox::new(10, 160, 60, 110);
        let analyzer = ScriptedAnalyzer::new().with(
            1,
            vec![observation(box_a, face_a()), observation(box_b, face_c())],
        );
        let mut matcher = FrameMatcher::new(Box::new(analyzer));

        let results = matcher
            .match_frame(&tagged_frame(1, 200, 100, 0), &refs(&[("alice", face_a())]))
            .unwrap();
        assert_eq!(
            results,
            vec![
                MatchResult::known(box_a, "alice"),
                MatchResult::unknown(box_b),
            ]
        );
    }

    #[test]
    fn test_no_faces_gives_empty_list() {
        let mut matcher = FrameMatcher::new(Box::new(ScriptedAnalyzer::new()));
        let results = matcher
            .match_frame(&tagged_frame(5, 20, 20, 0), &refs(&[("alice", face_a())]))
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_first_reference_wins_over_closer_one() {
        let probe = FaceSignature::new(vec![1.0, 0.05, 0.0]);
        let near_enough = FaceSignature::new(vec![1.0, 0.6, 0.0]);
        let exact = probe.clone();
        assert!(near_enough.distance(&probe) <= MATCH_TOLERANCE);

        let bbox = BoundingBox::new(0, 10, 10, 0);
        let analyzer = ScriptedAnalyzer::new().with(1, vec![observation(bbox, probe)]);
        let mut matcher = FrameMatcher::new(Box::new(analyzer));

        let results = matcher
            .match_frame(
                &tagged_frame(1, 20, 20, 0),
                &refs(&[("first", near_enough), ("exact", exact)]),
            )
            .unwrap();
        assert_eq!(results[0].name, "first");
    }

    #[test]
    fn test_tolerance_is_inclusive_and_configurable() {
        let probe = FaceSignature::new(vec![1.0, 1.0, 0.0]);
        let reference = face_a();
        let distance = reference.distance(&probe);

        let bbox = BoundingBox::new(0, 10, 10, 0);
        let analyzer = ScriptedAnalyzer::new().with(1, vec![observation(bbox, probe)]);
        let mut strict = FrameMatcher::new(Box::new(analyzer)).with_tolerance(distance - 1e-3);
        let set = refs(&[("alice", reference)]);
        assert!(strict.match_frame(&tagged_frame(1, 20, 20, 0), &set).unwrap()[0].is_unknown());

        let analyzer = ScriptedAnalyzer::new()
            .with(1, vec![observation(bbox, FaceSignature::new(vec![1.0, 1.0, 0.0]))]);
        let mut exact = FrameMatcher::new(Box::new(analyzer)).with_tolerance(distance);
        assert_eq!(exact.tolerance(), distance);
        assert_eq!(
            exact.match_frame(&tagged_frame(1, 20, 20, 0), &set).unwrap()[0].name,
            "alice"
        );
    }

    #[test]
    fn test_downscale_analyzes_small_frame_and_scales_boxes_back() {
        let small_box = BoundingBox::new(5, 30, 25, 10);
        let analyzer = ScriptedAnalyzer::new().with(3, vec![observation(small_box, face_a())]);
        let seen = analyzer.seen.clone();
        let mut matcher = FrameMatcher::new(Box::new(analyzer)).with_downscale(2);

        let results = matcher
            .match_frame(&tagged_frame(3, 640, 480, 4), &refs(&[("alice", face_a())]))
            .unwrap();

        assert_eq!(seen.lock().unwrap().as_slice(), &[(4, 320, 240)]);
        assert_eq!(results, vec![MatchResult::known(BoundingBox::new(10, 60, 50, 20), "alice")]);
    }

    #[test]
    fn test_analyzer_error_propagates() {
        let mut matcher = FrameMatcher::new(Box::new(ScriptedAnalyzer::new().failing_on(1)));
        assert!(matcher
            .match_frame(&tagged_frame(1, 8, 8, 0), &refs(&[("alice", face_a())]))
            .is_err());
    }
}
