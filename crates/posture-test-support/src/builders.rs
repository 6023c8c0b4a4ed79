//! Synthetic frame and prediction builders for testing.

#![allow(clippy::cast_precision_loss)]

use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use posture_core::domain::Frame;
use posture_core::inference::{RawDetection, RawPrediction};

/// Builder for synthetic camera frames.
pub struct SyntheticFrame;

impl SyntheticFrame {
    /// Creates a black frame.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> Frame {
        Frame::new(DynamicImage::new_rgb8(width, height))
    }

    /// Creates a frame filled with one colour.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let img = RgbImage::from_fn(width, height, |_, _| Rgb(rgb));
        Frame::new(DynamicImage::ImageRgb8(img))
    }

    /// Writes `count` small PNG frames named `frame-000.png`, `frame-001.png`, ...
    /// into `dir` and returns their paths in name order.
    ///
    /// Frame `i` is filled with grey level `i` so tests can tell them apart.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn write_pngs(dir: &Path, count: u8, width: u32, height: u32) -> anyhow::Result<Vec<PathBuf>> {
        (0..count)
            .map(|i| -> anyhow::Result<PathBuf> {
                let path = dir.join(format!("frame-{i:03}.png"));
                let img = RgbImage::from_fn(width, height, |_, _| Rgb([i, i, i]));
                DynamicImage::ImageRgb8(img).save(&path)?;
                Ok(path)
            })
            .collect()
    }
}

/// Builder for raw model predictions.
#[derive(Debug, Default)]
pub struct PredictionBuilder {
    detections: Vec<RawDetection>,
}

impl PredictionBuilder {
    /// Starts an empty prediction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a good-posture detection (label `0`).
    #[must_use]
    pub fn good(self, confidence: f32, bbox: [i32; 4]) -> Self {
        self.label(0, confidence, bbox)
    }

    /// Adds a bad-posture detection (label `1`).
    #[must_use]
    pub fn bad(self, confidence: f32, bbox: [i32; 4]) -> Self {
        self.label(1, confidence, bbox)
    }

    /// Adds a detection with an arbitrary label.
    #[must_use]
    pub fn label(mut self, label: i64, confidence: f32, [x1, y1, x2, y2]: [i32; 4]) -> Self {
        self.detections.push(RawDetection::new(
            x1 as f32, y1 as f32, x2 as f32, y2 as f32, confidence, label,
        ));
        self
    }

    /// Adds a detection as-is.
    #[must_use]
    pub fn raw(mut self, detection: RawDetection) -> Self {
        self.detections.push(detection);
        self
    }

    /// Finishes the prediction.
    #[must_use]
    pub fn build(self) -> RawPrediction {
        RawPrediction::new(self.detections)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_frame() {
        let frame = SyntheticFrame::solid(8, 4, [10, 20, 30]);
        assert_eq!((frame.width, frame.height), (8, 4));
        assert_eq!(frame.image.to_rgb8().get_pixel(3, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_prediction_builder() {
        let prediction = PredictionBuilder::new()
            .good(0.87, [10, 20, 110, 220])
            .label(2, 0.5, [1, 1, 2, 2])
            .build();

        assert_eq!(prediction.detections.len(), 2);
        assert_eq!(prediction.detections[0].class, Some(0));
        assert_eq!(prediction.detections[0].xmax, 110.0);
        assert_eq!(prediction.detections[1].class, Some(2));
    }
}
