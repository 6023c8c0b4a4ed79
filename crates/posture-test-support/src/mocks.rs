//! Mock implementations of core port traits.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use posture_core::domain::{Frame, PostureEvent};
use posture_core::error::{CameraError, LoadError};
use posture_core::inference::RawPrediction;
use posture_core::ports::{Camera, EventHandler, InferenceModel, Sleeper};

#[derive(Debug, Default)]
struct CameraState {
    open: bool,
    open_failures: usize,
    capture_failures: usize,
    open_calls: usize,
    captures: usize,
    closes: usize,
}

/// Mock implementation of `Camera` for testing.
///
/// Clones share state, so a test can keep one clone for assertions after
/// handing another to the monitor.
#[derive(Clone)]
pub struct MockCamera {
    state: Arc<Mutex<CameraState>>,
    width: u32,
    height: u32,
}

impl MockCamera {
    /// Creates a camera that always opens and captures 640x360 frames.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CameraState::default())),
            width: 640,
            height: 360,
        }
    }

    /// Makes the next `count` opens fail with `CouldNotOpenDevice`.
    #[must_use]
    pub fn fail_opens(self, count: usize) -> Self {
        self.fail_next_opens(count);
        self
    }

    /// Like [`fail_opens`](Self::fail_opens), for a camera already handed out.
    pub fn fail_next_opens(&self, count: usize) {
        self.lock().open_failures = count;
    }

    /// Makes the next `count` captures fail with `FrameRead`.
    #[must_use]
    pub fn fail_captures(self, count: usize) -> Self {
        self.lock().capture_failures = count;
        self
    }

    /// Returns the number of `open()` calls, including failed ones.
    #[must_use]
    pub fn open_calls(&self) -> usize {
        self.lock().open_calls
    }

    /// Returns the number of frames captured.
    #[must_use]
    pub fn captures(&self) -> usize {
        self.lock().captures
    }

    /// Returns the number of times an open device was released.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CameraState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for MockCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        let mut state = self.lock();
        state.open_calls += 1;

        if state.open {
            return Err(CameraError::AlreadyOpen);
        }
        if state.open_failures > 0 {
            state.open_failures -= 1;
            return Err(CameraError::CouldNotOpenDevice {
                device: "mock://camera".into(),
            });
        }

        state.open = true;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let mut state = self.lock();

        if !state.open {
            return Err(CameraError::NotOpen);
        }
        if state.capture_failures > 0 {
            state.capture_failures -= 1;
            return Err(CameraError::FrameRead {
                reason: "mock read failure".into(),
            });
        }

        state.captures += 1;
        Ok(Frame::new(image::DynamicImage::new_rgb8(
            self.width,
            self.height,
        )))
    }

    fn close(&mut self) {
        let mut state = self.lock();
        if state.open {
            state.open = false;
            state.closes += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }
}

enum Script {
    Sequence(VecDeque<anyhow::Result<RawPrediction>>),
    Always(RawPrediction),
}

/// Mock implementation of `InferenceModel` for testing.
///
/// Replays scripted predictions in order; once a sequence is exhausted,
/// every further call returns an empty prediction.
pub struct MockInferenceModel {
    script: Mutex<Script>,
    predict_calls: Arc<Mutex<usize>>,
    load_error: Option<String>,
    loaded: bool,
}

impl MockInferenceModel {
    /// Creates a model that replays `predictions` in order.
    #[must_use]
    pub fn with_predictions(predictions: Vec<RawPrediction>) -> Self {
        Self::scripted(predictions.into_iter().map(Ok).collect())
    }

    /// Creates a model that returns `prediction` on every call.
    #[must_use]
    pub fn always(prediction: RawPrediction) -> Self {
        Self::new(Script::Always(prediction))
    }

    /// Creates a model that never detects anything.
    #[must_use]
    pub fn empty() -> Self {
        Self::always(RawPrediction::empty())
    }

    /// Creates a model whose first prediction fails with `message`.
    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self::scripted(VecDeque::from([Err(anyhow::anyhow!(message.to_string()))]))
    }

    /// Makes `load()` fail with a rejection carrying `reason`.
    #[must_use]
    pub fn fail_load(mut self, reason: &str) -> Self {
        self.load_error = Some(reason.to_string());
        self
    }

    /// Returns a shared counter of `predict()` calls.
    #[must_use]
    pub fn predict_counter(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.predict_calls)
    }

    /// Returns whether `load()` succeeded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn scripted(sequence: VecDeque<anyhow::Result<RawPrediction>>) -> Self {
        Self::new(Script::Sequence(sequence))
    }

    fn new(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            predict_calls: Arc::new(Mutex::new(0)),
            load_error: None,
            loaded: false,
        }
    }
}

impl InferenceModel for MockInferenceModel {
    fn load(mut self) -> Result<Self, LoadError> {
        if let Some(reason) = self.load_error.take() {
            return Err(LoadError::Rejected { reason });
        }
        self.loaded = true;
        Ok(self)
    }

    fn predict(&self, _frame: &Frame) -> anyhow::Result<RawPrediction> {
        *self
            .predict_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner) += 1;

        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *script {
            Script::Always(prediction) => Ok(prediction.clone()),
            Script::Sequence(queue) => queue.pop_front().unwrap_or_else(|| Ok(RawPrediction::empty())),
        }
    }
}

/// Event handler that records every event it receives.
#[derive(Clone, Default)]
pub struct RecordingHandler {
    events: Arc<Mutex<Vec<PostureEvent>>>,
}

impl RecordingHandler {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<PostureEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl EventHandler<PostureEvent> for RecordingHandler {
    fn handle(&self, event: &PostureEvent) -> anyhow::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*event);
        Ok(())
    }
}

type SleepHook = Arc<dyn Fn(&[Duration]) + Send + Sync>;

/// Sleeper that records requested delays instead of blocking.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
    hook: Option<SleepHook>,
}

impl RecordingSleeper {
    /// Creates a sleeper that only records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `hook` after every recorded sleep with all delays so far.
    ///
    /// Useful for stopping a monitor after a number of cycles or retries.
    #[must_use]
    pub fn on_sleep(mut self, hook: impl Fn(&[Duration]) + Send + Sync + 'static) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Returns every requested delay, in order.
    #[must_use]
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the sum of all requested delays.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        let snapshot = {
            let mut sleeps = self.sleeps.lock().unwrap_or_else(PoisonError::into_inner);
            sleeps.push(duration);
            sleeps.clone()
        };
        if let Some(hook) = &self.hook {
            (**hook)(&snapshot);
        }
    }
}
