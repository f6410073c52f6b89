use serde::Serialize;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::UNKNOWN_NAME;

/// A face box in one frame and the name it resolved to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub bbox: BoundingBox,
    pub name: String,
}

impl MatchResult {
    pub fn known(bbox: BoundingBox, name: impl Into<String>) -> Self {
        Self {
            bbox,
            name: name.into(),
        }
    }

    pub fn unknown(bbox: BoundingBox) -> Self {
        Self::known(bbox, UNKNOWN_NAME)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_NAME
    }

    /// Same name, box mapped from a downscaled frame back to full size.
    pub fn scaled(&self, factor: u32) -> Self {
        Self {
            bbox: self.bbox.scaled(factor),
            name: self.name.clone(),
        }
    }
}
