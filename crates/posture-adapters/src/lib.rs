//! Posture Adapters - External adapters for the posture monitor.
//!
//! This crate provides adapters for:
//! - A camera backed by a directory of still frames
//! - An inference model served over HTTP

pub mod camera;
pub mod inference;

pub use camera::DirectoryCamera;
pub use inference::HttpInferenceModel;
