use std::path::Path;

use crate::encoding::domain::face_signature::FaceSignature;

/// One known face: the signature of the first face in a reference image and
/// the name taken from that image's file name.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceEntry {
    pub name: String,
    pub signature: FaceSignature,
}

/// Ordered, read-only collection of known faces for one run.
///
/// Order is the order the reference images were given in; matching relies
/// on it, since the earliest matching entry wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReferenceSet {
    entries: Vec<ReferenceEntry>,
}

impl ReferenceSet {
    pub fn new(entries: Vec<ReferenceEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// First entry, in reference order, whose signature lies within
    /// `tolerance` of `probe`. A closer entry later in the list does not win.
    pub fn first_match(&self, probe: &FaceSignature, tolerance: f64) -> Option<&ReferenceEntry> {
        self.entries
            .iter()
            .find(|entry| entry.signature.matches(probe, tolerance))
    }
}

/// Display name for a reference image: its base file name without the
/// final extension (`people/alice.smith.jpg` → `alice.smith`).
pub fn name_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(name: &str, values: Vec<f32>) -> ReferenceEntry {
        ReferenceEntry {
            name: name.to_string(),
            signature: FaceSignature::new(values),
        }
    }

    #[rstest]
    #[case::plain("alice.jpg", "alice")]
    #[case::nested("/photos/team/bob.png", "bob")]
    #[case::dotted("carol.smith.jpeg", "carol.smith")]
    #[case::no_extension("dave", "dave")]
    #[case::hidden(".eve", ".eve")]
    fn test_name_from_path(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(name_from_path(Path::new(path)), expected);
    }

    #[test]
    fn test_first_match_prefers_earlier_entry_over_closer_one() {
        let set = ReferenceSet::new(vec![
            entry("first", vec![1.0, 0.3]),
            entry("closer", vec![1.0, 0.0]),
        ]);
        let probe = FaceSignature::new(vec![1.0, 0.0]);
        assert!(set.entries()[1].signature.distance(&probe) < set.entries()[0].signature.distance(&probe));

        let hit = set.first_match(&probe, 0.5).unwrap();
        assert_eq!(hit.name, "first");
    }

    #[test]
    fn test_first_match_skips_entries_outside_tolerance() {
        let set = ReferenceSet::new(vec![
            entry("far", vec![0.0, 1.0]),
            entry("near", vec![1.0, 0.1]),
        ]);
        let probe = FaceSignature::new(vec![1.0, 0.0]);
        assert_eq!(set.first_match(&probe, 0.5).unwrap().name, "near");
    }

    #[test]
    fn test_first_match_none_when_nothing_close() {
        let set = ReferenceSet::new(vec![entry("far", vec![0.0, 1.0])]);
        let probe = FaceSignature::new(vec![1.0, 0.0]);
        assert!(set.first_match(&probe, 0.5).is_none());
    }

    #[test]
    fn test_names_in_reference_order() {
        let set = ReferenceSet::new(vec![entry("b", vec![1.0]), entry("a", vec![1.0])]);
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert!(ReferenceSet::default().is_empty());
    }
}
