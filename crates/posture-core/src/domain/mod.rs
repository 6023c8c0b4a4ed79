//! Core domain types for posture monitoring.

mod event;
mod frame;
mod posture;

pub use event::PostureEvent;
pub use frame::Frame;
pub use posture::{BoundingBox, Posture, PostureType};
