//! Raw model output types and detection post-processing.
//!
//! Models report candidate boxes; [`postprocess`] applies the load-time
//! [`InferenceConfig`] (confidence and IoU thresholds, allowed classes,
//! detection limit) to turn them into the final detection list.

mod config;
mod nms;

use serde::{Deserialize, Serialize};

pub use config::InferenceConfig;
pub use nms::{iou, postprocess};

/// One candidate box reported by a detection model.
///
/// Coordinates are in frame pixels. `confidence` and `class` may be absent
/// when the backend could not score or classify a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Left edge.
    pub xmin: f32,
    /// Top edge.
    pub ymin: f32,
    /// Right edge.
    pub xmax: f32,
    /// Bottom edge.
    pub ymax: f32,
    /// Detection confidence (0.0 to 1.0).
    #[serde(default)]
    pub confidence: Option<f32>,
    /// Class label.
    #[serde(default)]
    pub class: Option<i64>,
}

impl RawDetection {
    /// Creates a fully scored detection.
    #[must_use]
    pub const fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32, confidence: f32, class: i64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            confidence: Some(confidence),
            class: Some(class),
        }
    }

    /// Box area in square pixels; zero for inverted boxes.
    #[must_use]
    pub fn area(&self) -> f32 {
        (self.xmax - self.xmin).max(0.0) * (self.ymax - self.ymin).max(0.0)
    }
}

/// The full output of one `predict` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    /// Detections, in the order the model reported them.
    #[serde(default)]
    pub detections: Vec<RawDetection>,
}

impl RawPrediction {
    /// Creates a prediction from a list of detections.
    #[must_use]
    pub const fn new(detections: Vec<RawDetection>) -> Self {
        Self { detections }
    }

    /// A prediction with no detections.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the highest-confidence detection, if any.
    ///
    /// Unscored detections rank below every scored one.
    #[must_use]
    pub fn best(&self) -> Option<&RawDetection> {
        self.detections.iter().max_by(|a, b| {
            let a = a.confidence.unwrap_or(f32::NEG_INFINITY);
            let b = b.confidence.unwrap_or(f32::NEG_INFINITY);
            a.total_cmp(&b)
        })
    }

    /// Returns `true` when the model found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_best_picks_highest_confidence() {
        let prediction = RawPrediction::new(vec![
            RawDetection::new(1.0, 1.0, 5.0, 5.0, 0.4, 0),
            RawDetection::new(2.0, 2.0, 6.0, 6.0, 0.9, 1),
            RawDetection::new(3.0, 3.0, 7.0, 7.0, 0.6, 0),
        ]);

        let best = prediction.best().unwrap();
        assert_eq!(best.confidence, Some(0.9));
        assert_eq!(best.class, Some(1));
    }

    #[test]
    fn test_best_prefers_scored_detections() {
        let mut unscored = RawDetection::new(1.0, 1.0, 5.0, 5.0, 0.0, 0);
        unscored.confidence = None;
        let prediction =
            RawPrediction::new(vec![unscored, RawDetection::new(2.0, 2.0, 6.0, 6.0, 0.1, 0)]);

        assert_eq!(prediction.best().unwrap().confidence, Some(0.1));
    }

    #[test]
    fn test_empty_prediction() {
        assert!(RawPrediction::empty().best().is_none());
        assert!(RawPrediction::empty().is_empty());
    }

    #[test]
    fn test_area() {
        assert_eq!(RawDetection::new(0.0, 0.0, 4.0, 5.0, 1.0, 0).area(), 20.0);
        assert_eq!(RawDetection::new(4.0, 0.0, 0.0, 5.0, 1.0, 0).area(), 0.0);
    }

    #[test]
    fn test_detection_deserializes_missing_fields() {
        let det: RawDetection =
            serde_json::from_str(r#"{"xmin": 1, "ymin": 2, "xmax": 3, "ymax": 4}"#).unwrap();
        assert!(det.confidence.is_none());
        assert!(det.class.is_none());
    }
}
