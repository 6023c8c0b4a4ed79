//! Posture Core - Domain logic for posture monitoring
//!
//! This crate contains the posture domain types, the ports to the camera and
//! inference model, the event bus, and the sampling monitor that ties them
//! together with its start/stop lifecycle and retry/backoff policy.

pub mod bus;
pub mod detector;
pub mod domain;
pub mod error;
pub mod inference;
pub mod monitor;
pub mod ports;

pub use bus::EventBus;
pub use detector::Detector;
pub use domain::{BoundingBox, Frame, Posture, PostureEvent, PostureType};
pub use error::{BusError, CameraError, DetectionError, LoadError, MonitorError};
pub use inference::{InferenceConfig, RawDetection, RawPrediction};
pub use monitor::{Backoff, PostureMonitor};
pub use ports::{Camera, EventHandler, InferenceModel, Sleeper, ThreadSleeper};
