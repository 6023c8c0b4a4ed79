//! Check command - run a single detection cycle.

use anyhow::{Context, Result};
use clap::Args;
use posture_core::PostureEvent;
use tracing::info;

use super::{ExitCode, SharedArgs};
use crate::config::AppConfig;
use crate::output::JsonEventOutput;

/// Arguments for a one-shot check.
#[derive(Args, Clone, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub shared: SharedArgs,

    /// Pretty-print the result
    #[arg(long)]
    pub pretty: bool,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.shared = self.shared.with_config(config);
        if !self.pretty {
            self.pretty = config.output.pretty.unwrap_or(false);
        }
        self
    }
}

/// Run the check command.
///
/// Camera failures are reported rather than retried.
pub fn run(args: &CheckArgs) -> Result<ExitCode> {
    let monitor = args.shared.build_monitor()?;

    let posture = monitor.detect_once().context("Detection cycle failed")?;
    info!("Detected {posture}");

    JsonEventOutput::stdout(args.pretty).write(&PostureEvent::new(posture))?;
    Ok(ExitCode::Success)
}
