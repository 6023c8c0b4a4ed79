//! Confidence filtering and non-maximum suppression.

use super::{InferenceConfig, RawDetection, RawPrediction};

/// Intersection over union of two boxes.
#[must_use]
pub fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let ix = (a.xmax.min(b.xmax) - a.xmin.max(b.xmin)).max(0.0);
    let iy = (a.ymax.min(b.ymax) - a.ymin.max(b.ymin)).max(0.0);
    let intersection = ix * iy;
    let union = a.area() + b.area() - intersection;

    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Applies the load-time configuration to raw model candidates.
///
/// Steps, in order:
/// 1. drop candidates without a score or class, or below the confidence threshold
/// 2. drop classes outside `config.classes`
/// 3. keep one label per box unless `multi_label` is set
/// 4. greedy IoU suppression, per class unless `agnostic`
/// 5. keep at most `max_det`, highest confidence first
#[must_use]
pub fn postprocess(prediction: RawPrediction, config: &InferenceConfig) -> RawPrediction {
    let mut candidates: Vec<RawDetection> = prediction
        .detections
        .into_iter()
        .filter(|d| match (d.confidence, d.class) {
            (Some(conf), Some(class)) => {
                conf >= config.confidence_threshold && config.allows_class(class)
            }
            _ => false,
        })
        .collect();

    // Sorted by descending confidence; every remaining candidate is scored.
    candidates.sort_by(|a, b| {
        let a = a.confidence.unwrap_or_default();
        let b = b.confidence.unwrap_or_default();
        b.total_cmp(&a)
    });

    if !config.multi_label {
        let mut single: Vec<RawDetection> = Vec::with_capacity(candidates.len());
        for det in candidates {
            if !single.iter().any(|kept| same_box(kept, &det)) {
                single.push(det);
            }
        }
        candidates = single;
    }

    let mut kept: Vec<RawDetection> = Vec::new();
    for det in candidates {
        if kept.len() >= config.max_det {
            break;
        }
        let suppressed = kept.iter().any(|k| {
            (config.agnostic || k.class == det.class) && iou(k, &det) > config.iou_threshold
        });
        if !suppressed {
            kept.push(det);
        }
    }

    RawPrediction::new(kept)
}

#[allow(clippy::float_cmp)]
fn same_box(a: &RawDetection, b: &RawDetection) -> bool {
    a.xmin == b.xmin && a.ymin == b.ymin && a.xmax == b.xmax && a.ymax == b.ymax
}
