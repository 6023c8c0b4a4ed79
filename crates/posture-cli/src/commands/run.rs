//! Run command - monitor posture until stopped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use anyhow::{Context, Result};
use clap::Args;
use posture_core::{EventHandler, PostureEvent, PostureMonitor};
use tracing::info;

use super::{ExitCode, SharedArgs};
use crate::config::AppConfig;
use crate::output::{JsonEventOutput, StatusLine};

/// Arguments for the monitor.
#[derive(Args, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub shared: SharedArgs,

    /// Stop after this many events
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_events: Option<u64>,

    /// Show the latest posture on a status line (stderr)
    #[arg(long)]
    pub status: bool,

    /// Pretty-print each event
    #[arg(long)]
    pub pretty: bool,
}

impl RunArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.shared = self.shared.with_config(config);

        // Boolean output options: CLI flag wins, then config
        if !self.status {
            self.status = config.output.status.unwrap_or(false);
        }
        if !self.pretty {
            self.pretty = config.output.pretty.unwrap_or(false);
        }

        self
    }
}

/// Run the monitor until it is stopped or fails.
///
/// Expects `args` to have been processed through `with_config()` first.
pub fn run(args: &RunArgs) -> Result<ExitCode> {
    let monitor = Arc::new(args.shared.build_monitor()?);

    monitor.subscribe(Arc::new(JsonEventOutput::stdout(args.pretty)));

    let status = args.status.then(|| Arc::new(StatusLine::new()));
    if let Some(ref status) = status {
        monitor.subscribe(status.clone());
    }

    if let Some(limit) = args.max_events {
        monitor.subscribe(Arc::new(EventLimit::new(limit, Arc::downgrade(&monitor))));
    }

    info!("Sampling every {}s", monitor.interval().as_secs());
    let result = monitor.start();

    if let Some(status) = status {
        status.finish();
    }

    result.context("Posture monitor failed")?;
    Ok(ExitCode::Success)
}

/// Stops the monitor once a number of events has been delivered.
struct EventLimit {
    limit: u64,
    seen: AtomicU64,
    monitor: Weak<PostureMonitor>,
}

impl EventLimit {
    const fn new(limit: u64, monitor: Weak<PostureMonitor>) -> Self {
        Self {
            limit,
            seen: AtomicU64::new(0),
            monitor,
        }
    }
}

impl EventHandler<PostureEvent> for EventLimit {
    fn handle(&self, _event: &PostureEvent) -> Result<()> {
        let seen = self.seen.fetch_add(1, Ordering::SeqCst) + 1;

        if seen == self.limit {
            if let Some(monitor) = self.monitor.upgrade() {
                info!("Reached {seen} event(s), stopping");
                monitor.stop()?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use posture_core::Posture;

    use super::*;

    #[test]
    fn test_event_limit_without_monitor_is_harmless() {
        let limit = EventLimit::new(1, Weak::new());
        let event = PostureEvent::new(Posture::unknown());

        limit.handle(&event).unwrap();
        limit.handle(&event).unwrap();
        assert_eq!(limit.seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_event_limit_reports_stopped_monitor() {
        struct NoCamera;

        impl posture_core::Camera for NoCamera {
            fn open(&mut self) -> Result<(), posture_core::CameraError> {
                Err(posture_core::CameraError::NotOpen)
            }
            fn capture(&mut self) -> Result<posture_core::Frame, posture_core::CameraError> {
                Err(posture_core::CameraError::NotOpen)
            }
            fn close(&mut self) {}
            fn is_open(&self) -> bool {
                false
            }
        }

        struct NoModel;

        impl posture_core::InferenceModel for NoModel {
            fn load(self) -> Result<Self, posture_core::LoadError> {
                Ok(self)
            }
            fn predict(&self, _frame: &posture_core::Frame) -> Result<posture_core::RawPrediction> {
                Ok(posture_core::RawPrediction::empty())
            }
        }

        let monitor = Arc::new(PostureMonitor::new(
            Box::new(NoCamera),
            Arc::new(NoModel),
            Duration::from_secs(1),
        ));
        let limit = EventLimit::new(1, Arc::downgrade(&monitor));

        // Stopping a monitor that never started surfaces as a handler error
        let err = limit
            .handle(&PostureEvent::new(Posture::unknown()))
            .unwrap_err();
        assert!(err.to_string().contains("not running"));
    }
}
