use std::collections::BTreeSet;

use serde::Serialize;

use crate::recognition::domain::match_result::MatchResult;

/// Names of known people seen so far in one run.
///
/// Only grows; "Unknown" is never recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FoundNames {
    names: BTreeSet<String>,
}

impl FoundNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every known name in `results`. Returns whether the set grew.
    pub fn record(&mut self, results: &[MatchResult]) -> bool {
        let before = self.names.len();
        for r in results.iter().filter(|r| !r.is_unknown()) {
            self.names.insert(r.name.clone());
        }
        self.names.len() > before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;

    fn result(name: &str) -> MatchResult {
        MatchResult::known(BoundingBox::new(0, 1, 1, 0), name)
    }

    #[test]
    fn test_record_ignores_unknown() {
        let mut found = FoundNames::new();
        let grew = found.record(&[MatchResult::unknown(BoundingBox::new(0, 1, 1, 0))]);
        assert!(!grew);
        assert!(found.is_empty());
    }

    #[test]
    fn test_record_deduplicates_and_reports_growth() {
        let mut found = FoundNames::new();
        assert!(found.record(&[result("bob"), result("alice"), result("bob")]));
        assert!(!found.record(&[result("alice")]));
        assert_eq!(found.len(), 2);
        assert_eq!(found.iter().collect::<Vec<_>>(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_never_shrinks() {
        let mut found = FoundNames::new();
        found.record(&[result("alice")]);
        found.record(&[]);
        assert!(found.contains("alice"));
    }

    #[test]
    fn test_serializes_as_array() {
        let mut found = FoundNames::new();
        found.record(&[result("bob"), result("alice")]);
        assert_eq!(
            serde_json::to_string(&found).unwrap(),
            r#"["alice","bob"]"#
        );
    }
}
