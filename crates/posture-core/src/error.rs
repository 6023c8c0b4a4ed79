//! Error types for the posture core.

use thiserror::Error;

/// Failures reported by a [`Camera`](crate::ports::Camera) implementation.
#[derive(Debug, Error)]
pub enum CameraError {
    /// `open` was called on a camera that is already open.
    #[error("camera is already open, cannot open again")]
    AlreadyOpen,
    /// The device does not exist or refused to open.
    #[error("could not open the video device {device}")]
    CouldNotOpenDevice {
        /// Device identifier that failed to open.
        device: String,
    },
    /// A frame could not be read from an open device.
    #[error("could not read frame from video device: {reason}")]
    FrameRead {
        /// Why the read failed.
        reason: String,
    },
    /// `capture` was called before `open`.
    #[error("video capture not started")]
    NotOpen,
}

/// Failures while turning a frame into a posture.
#[derive(Debug, Error)]
pub enum DetectionError {
    /// The model returned a class label with no posture mapping.
    #[error("invalid label value: {0}")]
    InvalidLabel(i64),
    /// The inference model failed to produce a prediction.
    #[error("inference failed")]
    Inference(#[source] anyhow::Error),
}

/// Failures while loading an inference model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The model file or identifier could not be found.
    #[error("model not found: {path}")]
    ModelNotFound {
        /// Model path that was requested.
        path: String,
    },
    /// The model backend refused the model or its configuration.
    #[error("model rejected: {reason}")]
    Rejected {
        /// Reason reported by the backend.
        reason: String,
    },
    /// The model backend could not be reached.
    #[error("failed to reach model backend")]
    Transport(#[source] anyhow::Error),
}

/// Failures reported by the [`EventBus`](crate::bus::EventBus).
#[derive(Debug, Error)]
pub enum BusError {
    /// `unsubscribe` was called with a handler that is not registered.
    #[error("handler is not subscribed")]
    NotFound,
    /// A handler failed; delivery to later handlers was abandoned.
    #[error("event handler failed")]
    Handler(#[source] anyhow::Error),
}

/// Failures reported by the [`PostureMonitor`](crate::monitor::PostureMonitor).
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The camera could not be opened. Retryable.
    #[error("no camera found or could not open the video device")]
    NoCameraFound(#[source] CameraError),
    /// A frame could not be captured. Retryable.
    #[error("could not capture frame from the video device")]
    Capture(#[source] CameraError),
    /// `start` was called while the monitor was running.
    #[error("posture monitor is already running")]
    AlreadyRunning,
    /// `stop` was called while the monitor was stopped.
    #[error("posture monitor is not running")]
    NotRunning,
    /// The camera was misused (for example opened twice).
    #[error(transparent)]
    Camera(CameraError),
    /// Detection failed in a way that retrying cannot fix.
    #[error(transparent)]
    Detection(#[from] DetectionError),
    /// A subscriber failed while handling an event.
    #[error("posture event subscriber failed")]
    Subscriber(#[source] anyhow::Error),
}

impl MonitorError {
    /// Returns `true` for transient camera failures absorbed by the retry loop.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NoCameraFound(_) | Self::Capture(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(MonitorError::NoCameraFound(CameraError::CouldNotOpenDevice {
            device: "/dev/video0".into(),
        })
        .is_retryable());
        assert!(MonitorError::Capture(CameraError::FrameRead {
            reason: "eof".into(),
        })
        .is_retryable());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(!MonitorError::AlreadyRunning.is_retryable());
        assert!(!MonitorError::NotRunning.is_retryable());
        assert!(!MonitorError::Camera(CameraError::AlreadyOpen).is_retryable());
        assert!(!MonitorError::Detection(DetectionError::InvalidLabel(2)).is_retryable());
        assert!(!MonitorError::Subscriber(anyhow::anyhow!("boom")).is_retryable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DetectionError::InvalidLabel(2).to_string(),
            "invalid label value: 2"
        );
        assert_eq!(
            MonitorError::Camera(CameraError::AlreadyOpen).to_string(),
            "camera is already open, cannot open again"
        );
    }
}
