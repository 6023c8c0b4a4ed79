//! Test support utilities for the posture monitor.
//!
//! Provides scripted mocks for every core port and builders for frames and
//! raw model predictions.
//!
//! # Example
//!
//! ```
//! use posture_test_support::{MockCamera, MockInferenceModel, PredictionBuilder};
//!
//! // A camera whose first open fails, and a model that sees good posture
//! let camera = MockCamera::new().fail_opens(1);
//! let model = MockInferenceModel::always(
//!     PredictionBuilder::new().good(0.9, [10, 20, 110, 220]).build(),
//! );
//! ```

mod builders;
mod mocks;

pub use builders::{PredictionBuilder, SyntheticFrame};
pub use mocks::{MockCamera, MockInferenceModel, RecordingHandler, RecordingSleeper};
