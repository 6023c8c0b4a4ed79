//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the monitoring core and the
//! camera, the inference model, event consumers, and the clock.

mod camera;
mod event_handler;
mod inference_model;
mod sleeper;

pub use camera::Camera;
pub use event_handler::EventHandler;
pub use inference_model::InferenceModel;
pub use sleeper::{Sleeper, ThreadSleeper};
