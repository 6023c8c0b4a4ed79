//! The posture sampling monitor.
//!
//! [`PostureMonitor`] owns the sampling loop: open the camera, capture a
//! frame, detect, close the camera, publish a [`PostureEvent`], sleep. A
//! retry controller absorbs transient camera failures with exponential
//! backoff; every other failure ends the loop.

mod retry;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

pub use retry::Backoff;
use retry::RetryState;

use crate::bus::EventBus;
use crate::detector::Detector;
use crate::domain::{Posture, PostureEvent};
use crate::error::{BusError, CameraError, MonitorError};
use crate::ports::{Camera, EventHandler, InferenceModel, Sleeper, ThreadSleeper};

/// Periodically samples the camera and publishes posture events.
///
/// [`start`](Self::start) blocks the calling thread until the monitor is
/// stopped or fails. To stop it, share the monitor through an `Arc` and
/// call [`stop`](Self::stop) from another thread or from an event handler.
///
/// Every `start` begins a new loop generation and `stop` retires the
/// current one, so a loop stopped mid-sleep exits on waking even if the
/// monitor was restarted meanwhile. At most one loop samples at a time.
/// Beyond that the monitor does not coordinate concurrent `start`/`stop`
/// callers; sequencing lifecycle calls is the caller's responsibility.
pub struct PostureMonitor {
    camera: Mutex<Box<dyn Camera>>,
    detector: Detector,
    interval: Duration,
    backoff: Backoff,
    sleeper: Arc<dyn Sleeper>,
    bus: EventBus<PostureEvent>,
    running: AtomicBool,
    generation: AtomicU64,
}

impl PostureMonitor {
    /// Creates a stopped monitor sampling every `interval`.
    #[must_use]
    pub fn new(
        camera: Box<dyn Camera>,
        model: Arc<dyn InferenceModel>,
        interval: Duration,
    ) -> Self {
        Self {
            camera: Mutex::new(camera),
            detector: Detector::new(model),
            interval,
            backoff: Backoff::default(),
            sleeper: Arc::new(ThreadSleeper),
            bus: EventBus::new(),
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Replaces the retry backoff schedule.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replaces how the monitor waits between cycles and retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Subscribes a handler to posture events.
    pub fn subscribe(&self, handler: Arc<dyn EventHandler<PostureEvent>>) {
        self.bus.subscribe(handler);
    }

    /// Removes the first registration of `handler`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NotFound`] if `handler` is not subscribed.
    pub fn unsubscribe(&self, handler: &Arc<dyn EventHandler<PostureEvent>>) -> Result<(), BusError> {
        self.bus.unsubscribe(handler)
    }

    /// Returns `true` while the sampling loop is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Sampling interval between cycles.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts sampling and blocks until stopped or a fatal error occurs.
    ///
    /// Camera open and capture failures are retried with backoff and never
    /// reach the caller. The retry count starts from zero on every call.
    ///
    /// # Errors
    ///
    /// - [`MonitorError::AlreadyRunning`] if the monitor is already running
    /// - any non-retryable failure from a cycle (detection, subscriber, or
    ///   camera misuse), after which the monitor is stopped
    pub fn start(&self) -> Result<(), MonitorError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MonitorError::AlreadyRunning);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Posture monitor started (interval {:?})", self.interval);

        let result = self.run_with_retry(generation);

        if let Err(ref e) = result {
            warn!("Posture monitor terminated: {e}");
            // A later start owns the flag and the camera now
            if self.retire(generation) {
                self.running.store(false, Ordering::SeqCst);
                self.close_camera();
            }
        } else {
            info!("Posture monitor stopped");
        }

        result
    }

    /// Stops sampling and releases the camera.
    ///
    /// The flag is observed at the top of the next cycle; a cycle already
    /// in progress completes first.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::NotRunning`] if the monitor is stopped.
    pub fn stop(&self) -> Result<(), MonitorError> {
        if self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MonitorError::NotRunning);
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("Stop requested");
        self.close_camera();
        Ok(())
    }

    /// Runs one open-capture-detect-close cycle without publishing.
    ///
    /// # Errors
    ///
    /// Returns the cycle's failure unchanged; nothing is retried.
    pub fn detect_once(&self) -> Result<Posture, MonitorError> {
        self.detect_posture()
    }

    fn run_with_retry(&self, generation: u64) -> Result<(), MonitorError> {
        let mut retry = RetryState::new(self.backoff);

        loop {
            match self.sampling_loop(generation) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() => {
                    let delay = retry.next_delay();
                    debug!(
                        "Error occurred: {e}, retrying in {delay:?} (attempt {})",
                        retry.retries()
                    );
                    self.sleeper.sleep(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn sampling_loop(&self, generation: u64) -> Result<(), MonitorError> {
        while self.is_current(generation) {
            let posture = self.detect_posture()?;
            debug!("Detected {posture}");

            self.bus
                .notify(&PostureEvent::new(posture))
                .map_err(|e| MonitorError::Subscriber(e.into()))?;

            self.sleeper.sleep(self.interval);
        }
        Ok(())
    }

    fn detect_posture(&self) -> Result<Posture, MonitorError> {
        let mut camera = self.lock_camera();
        let mut session = CameraSession::open(&mut **camera)?;

        let frame = session
            .camera
            .capture()
            .map_err(|e| match e {
                CameraError::FrameRead { .. } => MonitorError::Capture(e),
                other => MonitorError::Camera(other),
            })?;

        Ok(self.detector.detect(&frame)?.unwrap_or_else(Posture::unknown))
    }

    /// Returns `true` while `generation` is the loop allowed to sample.
    fn is_current(&self, generation: u64) -> bool {
        self.is_running() && self.generation.load(Ordering::SeqCst) == generation
    }

    /// Ends `generation` unless a `stop` or a newer `start` already has.
    fn retire(&self, generation: u64) -> bool {
        self.generation
            .compare_exchange(
                generation,
                generation.wrapping_add(1),
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    fn close_camera(&self) {
        self.lock_camera().close();
    }

    fn lock_camera(&self) -> MutexGuard<'_, Box<dyn Camera>> {
        self.camera.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An open camera that is closed when dropped.
struct CameraSession<'a> {
    camera: &'a mut dyn Camera,
}

impl<'a> CameraSession<'a> {
    fn open(camera: &'a mut dyn Camera) -> Result<Self, MonitorError> {
        camera.open().map_err(|e| match e {
            CameraError::CouldNotOpenDevice { .. } => MonitorError::NoCameraFound(e),
            other => MonitorError::Camera(other),
        })?;
        Ok(Self { camera })
    }
}

impl Drop for CameraSession<'_> {
    fn drop(&mut self) {
        self.camera.close();
    }
}
