//! Events published by the posture monitor.

use serde::{Deserialize, Serialize};

use super::Posture;

/// Published once per completed sampling cycle.
///
/// Serializes to `{"posture": {"type": .., "confidence": .., "bounding_box": [..]}}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureEvent {
    /// The posture observed in this cycle.
    pub posture: Posture,
}

impl PostureEvent {
    /// Wraps a posture in an event.
    #[must_use]
    pub const fn new(posture: Posture) -> Self {
        Self { posture }
    }
}
