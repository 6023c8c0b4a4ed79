//! Posture classification values.

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// The classified stance of the monitored subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureType {
    /// Upright, healthy posture (model label `0`).
    Good,
    /// Slouched or otherwise unhealthy posture (model label `1`).
    Bad,
    /// Nothing was detected in the sampled frame.
    Unknown,
}

impl PostureType {
    /// Maps a model class label to a posture type.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::InvalidLabel`] for any label other than `0`
    /// or `1`. This indicates a model/configuration mismatch.
    pub fn from_label(label: i64) -> Result<Self, DetectionError> {
        match label {
            0 => Ok(Self::Good),
            1 => Ok(Self::Bad),
            other => Err(DetectionError::InvalidLabel(other)),
        }
    }

    /// Returns the lowercase name used in serialized records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PostureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounding box in integer pixel coordinates.
///
/// Serialized as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    /// Left edge.
    pub x1: i32,
    /// Top edge.
    pub y1: i32,
    /// Right edge.
    pub x2: i32,
    /// Bottom edge.
    pub y2: i32,
}

impl BoundingBox {
    /// Creates a bounding box from its corner coordinates.
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Returns `true` for the `(0, 0, 0, 0)` box.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.x1 == 0 && self.y1 == 0 && self.x2 == 0 && self.y2 == 0
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

/// A posture classification produced by one sampling cycle.
///
/// Values are immutable once built; use the accessors to read them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posture {
    #[serde(rename = "type")]
    posture_type: PostureType,
    confidence: f32,
    bounding_box: BoundingBox,
}

impl Posture {
    /// Creates a posture. `confidence` is clamped into `0.0..=1.0`.
    #[must_use]
    pub fn new(posture_type: PostureType, confidence: f32, bounding_box: BoundingBox) -> Self {
        Self {
            posture_type,
            confidence: confidence.clamp(0.0, 1.0),
            bounding_box,
        }
    }

    /// The sentinel for "no detection this cycle".
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            posture_type: PostureType::Unknown,
            confidence: 0.0,
            bounding_box: BoundingBox::new(0, 0, 0, 0),
        }
    }

    /// The classified posture.
    #[must_use]
    pub const fn posture_type(&self) -> PostureType {
        self.posture_type
    }

    /// Detection confidence (0.0 to 1.0).
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Where the subject was found in the frame.
    #[must_use]
    pub const fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Returns `true` if this is the no-detection sentinel.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.posture_type == PostureType::Unknown
    }
}

impl std::fmt::Display for Posture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.bounding_box;
        write!(
            f,
            "Posture(type={}, confidence={:.2}, bounding_box=({}, {}, {}, {}))",
            self.posture_type, self.confidence, b.x1, b.y1, b.x2, b.y2
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(PostureType::from_label(0).unwrap(), PostureType::Good);
        assert_eq!(PostureType::from_label(1).unwrap(), PostureType::Bad);
    }

    #[test]
    fn test_from_label_rejects_unknown_labels() {
        for label in [2, -1, 42] {
            let err = PostureType::from_label(label).unwrap_err();
            assert!(matches!(err, DetectionError::InvalidLabel(l) if l == label));
        }
    }

    #[test]
    fn test_unknown_sentinel() {
        let posture = Posture::unknown();
        assert_eq!(posture.posture_type(), PostureType::Unknown);
        assert_eq!(posture.confidence(), 0.0);
        assert!(posture.bounding_box().is_degenerate());
        assert!(posture.is_unknown());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let high = Posture::new(PostureType::Good, 1.7, BoundingBox::default());
        let low = Posture::new(PostureType::Bad, -0.2, BoundingBox::default());
        assert_eq!(high.confidence(), 1.0);
        assert_eq!(low.confidence(), 0.0);
    }

    #[test]
    fn test_bounding_box_serializes_as_array() {
        let json = serde_json::to_string(&BoundingBox::new(10, 20, 110, 220)).unwrap();
        assert_eq!(json, "[10,20,110,220]");

        let parsed: BoundingBox = serde_json::from_str("[1,2,3,4]").unwrap();
        assert_eq!(parsed, BoundingBox::new(1, 2, 3, 4));
    }

    #[test]
    fn test_display() {
        let posture = Posture::new(PostureType::Good, 0.87, BoundingBox::new(10, 20, 110, 220));
        assert_eq!(
            posture.to_string(),
            "Posture(type=good, confidence=0.87, bounding_box=(10, 20, 110, 220))"
        );
    }
}
