//! Load-time inference configuration.

use serde::{Deserialize, Serialize};

/// Detection settings fixed when a model is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Minimum confidence for a detection to be kept.
    pub confidence_threshold: f32,
    /// Overlap above which the weaker of two boxes is suppressed.
    pub iou_threshold: f32,
    /// Class labels the model may report. Empty allows every class.
    pub classes: Vec<i64>,
    /// Suppress overlapping boxes across classes, not only within one.
    pub agnostic: bool,
    /// Allow one box to carry more than one label.
    pub multi_label: bool,
    /// Maximum detections per frame.
    pub max_det: usize,
    /// Run inference with automatic mixed precision.
    pub amp: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            iou_threshold: 0.5,
            classes: vec![0, 1],
            agnostic: false,
            multi_label: false,
            max_det: 1,
            amp: true,
        }
    }
}

impl InferenceConfig {
    /// Returns `true` if `class` passes the class filter.
    #[must_use]
    pub fn allows_class(&self, class: i64) -> bool {
        self.classes.is_empty() || self.classes.contains(&class)
    }
}
