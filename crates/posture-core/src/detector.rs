//! Posture detection on top of an inference model.

#![allow(clippy::cast_possible_truncation)]

use std::sync::Arc;

use tracing::trace;

use crate::domain::{BoundingBox, Frame, Posture, PostureType};
use crate::error::DetectionError;
use crate::inference::RawDetection;
use crate::ports::InferenceModel;

/// Turns frames into postures using an inference model.
pub struct Detector {
    model: Arc<dyn InferenceModel>,
}

impl Detector {
    /// Creates a detector backed by a loaded model.
    #[must_use]
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self { model }
    }

    /// Classifies the posture in `frame`.
    ///
    /// Returns `Ok(None)` when the model found nothing usable: no
    /// detections, a box coordinate that truncates to zero, or a missing
    /// label or confidence.
    ///
    /// # Errors
    ///
    /// - [`DetectionError::Inference`] if the model fails
    /// - [`DetectionError::InvalidLabel`] if the best detection has a label
    ///   other than `0` (good) or `1` (bad)
    pub fn detect(&self, frame: &Frame) -> Result<Option<Posture>, DetectionError> {
        let prediction = self
            .model
            .predict(frame)
            .map_err(DetectionError::Inference)?;

        let Some(best) = prediction.best() else {
            trace!("No detections in frame");
            return Ok(None);
        };

        to_posture(best)
    }
}

fn to_posture(detection: &RawDetection) -> Result<Option<Posture>, DetectionError> {
    let bbox = BoundingBox::new(
        detection.xmin as i32,
        detection.ymin as i32,
        detection.xmax as i32,
        detection.ymax as i32,
    );

    if bbox.x1 == 0 || bbox.y1 == 0 || bbox.x2 == 0 || bbox.y2 == 0 {
        trace!("Discarding detection with zero coordinate: {bbox:?}");
        return Ok(None);
    }

    let (Some(label), Some(confidence)) = (detection.class, detection.confidence) else {
        trace!("Discarding detection without label or confidence");
        return Ok(None);
    };

    let posture_type = PostureType::from_label(label)?;
    Ok(Some(Posture::new(posture_type, confidence, bbox)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::inference::RawPrediction;

    struct FixedModel(anyhow::Result<RawPrediction>);

    impl InferenceModel for FixedModel {
        fn load(self) -> Result<Self, LoadError> {
            Ok(self)
        }

        fn predict(&self, _frame: &Frame) -> anyhow::Result<RawPrediction> {
            match &self.0 {
                Ok(prediction) => Ok(prediction.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    fn detector(detections: Vec<RawDetection>) -> Detector {
        Detector::new(Arc::new(FixedModel(Ok(RawPrediction::new(detections)))))
    }

    fn frame() -> Frame {
        Frame::new(image::DynamicImage::new_rgb8(4, 4))
    }

    #[test]
    fn test_detects_good_posture() {
        let det = detector(vec![RawDetection::new(10.4, 20.9, 110.0, 220.2, 0.87, 0)]);

        let posture = det.detect(&frame()).unwrap().unwrap();

        assert_eq!(posture.posture_type(), PostureType::Good);
        assert_eq!(posture.confidence(), 0.87);
        assert_eq!(posture.bounding_box(), BoundingBox::new(10, 20, 110, 220));
    }

    #[test]
    fn test_detects_bad_posture() {
        let det = detector(vec![RawDetection::new(5.0, 5.0, 50.0, 50.0, 0.6, 1)]);
        let posture = det.detect(&frame()).unwrap().unwrap();
        assert_eq!(posture.posture_type(), PostureType::Bad);
    }

    #[test]
    fn test_no_detections_is_none() {
        assert!(detector(vec![]).detect(&frame()).unwrap().is_none());
    }

    #[test]
    fn test_zero_coordinate_is_none() {
        let det = detector(vec![RawDetection::new(0.0, 20.0, 110.0, 220.0, 0.9, 0)]);
        assert!(det.detect(&frame()).unwrap().is_none());

        // Truncation toward zero counts as zero.
        let det = detector(vec![RawDetection::new(10.0, 0.7, 110.0, 220.0, 0.9, 0)]);
        assert!(det.detect(&frame()).unwrap().is_none());
    }

    #[test]
    fn test_missing_label_or_confidence_is_none() {
        let mut no_label = RawDetection::new(10.0, 20.0, 110.0, 220.0, 0.9, 0);
        no_label.class = None;
        assert!(detector(vec![no_label]).detect(&frame()).unwrap().is_none());

        let mut no_conf = RawDetection::new(10.0, 20.0, 110.0, 220.0, 0.9, 0);
        no_conf.confidence = None;
        assert!(detector(vec![no_conf]).detect(&frame()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_label_is_error() {
        let det = detector(vec![RawDetection::new(10.0, 20.0, 110.0, 220.0, 0.9, 2)]);
        let err = det.detect(&frame()).unwrap_err();
        assert!(matches!(err, DetectionError::InvalidLabel(2)));
    }

    #[test]
    fn test_uses_best_detection() {
        let det = detector(vec![
            RawDetection::new(10.0, 10.0, 20.0, 20.0, 0.55, 0),
            RawDetection::new(30.0, 30.0, 40.0, 40.0, 0.91, 1),
        ]);
        let posture = det.detect(&frame()).unwrap().unwrap();
        assert_eq!(posture.posture_type(), PostureType::Bad);
        assert_eq!(posture.bounding_box(), BoundingBox::new(30, 30, 40, 40));
    }

    #[test]
    fn test_model_failure_is_inference_error() {
        let det = Detector::new(Arc::new(FixedModel(Err(anyhow::anyhow!("gpu lost")))));
        let err = det.detect(&frame()).unwrap_err();
        assert!(matches!(err, DetectionError::Inference(ref e) if e.to_string() == "gpu lost"));
    }
}
