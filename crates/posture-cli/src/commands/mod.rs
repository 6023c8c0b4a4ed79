//! CLI command definitions and handlers.

pub mod check;
pub mod run;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use posture_adapters::{DirectoryCamera, HttpInferenceModel};
use posture_core::{Backoff, InferenceConfig, InferenceModel, PostureMonitor};
use tracing::{debug, info};

use crate::config::AppConfig;

/// Posture - Monitors sitting posture through a camera
#[derive(Parser)]
#[command(name = "posture")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Monitor arguments used when no subcommand is given.
    #[command(flatten)]
    pub run: run::RunArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Monitor posture continuously, printing one JSON line per event
    Run(run::RunArgs),
    /// Run a single detection cycle and print the result
    Check(check::CheckArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Monitor stopped cleanly or the check succeeded.
    Success = 0,
    /// Startup failure or fatal monitor error.
    Error = 1,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Hardcoded fallbacks when neither CLI nor config sets a value.
mod defaults {
    pub const MODEL_PATH: &str = "./data/models/small640.pt";
    pub const SERVER_URL: &str = "http://127.0.0.1:8080";
    pub const CAMERA_DIR: &str = "./data/camera";
    pub const INTERVAL_SECS: u64 = 2;
    pub const TIMEOUT_SECS: u64 = 30;
    pub const RETRY_BASE_SECS: u64 = 5;
    pub const RETRY_CAP_SECS: u64 = 600;
}

/// Parse and validate a threshold value (0.0-1.0).
fn parse_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

/// Parse a sampling interval in whole seconds (at least 1).
fn parse_interval(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a whole number of seconds"))?;
    if value == 0 {
        Err(String::from("interval must be at least 1 second"))
    } else {
        Ok(value)
    }
}

/// Model, camera, and timing arguments shared by every command.
#[derive(Args, Clone, Default)]
pub struct SharedArgs {
    /// Model weights path, as known to the inference server
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Inference server base URL
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Camera device (a directory of frames)
    #[arg(long, value_name = "DIR")]
    pub camera: Option<PathBuf>,

    /// Seconds between samples
    #[arg(long, value_name = "SECS", value_parser = parse_interval)]
    pub interval: Option<u64>,

    /// Minimum detection confidence (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub confidence_threshold: Option<f32>,

    /// IoU threshold for overlapping detections (0.0-1.0)
    #[arg(long, value_parser = parse_threshold)]
    pub iou_threshold: Option<f32>,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: AppConfig,
}

impl SharedArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.model.is_none() {
            self.model.clone_from(&config.model.path);
        }
        if self.server_url.is_none() {
            self.server_url.clone_from(&config.model.server_url);
        }
        if self.camera.is_none() {
            self.camera.clone_from(&config.camera.device);
        }
        self.interval = self.interval.or(config.monitor.interval_secs);
        self.confidence_threshold = self
            .confidence_threshold
            .or(config.model.confidence_threshold);
        self.iou_threshold = self.iou_threshold.or(config.model.iou_threshold);

        // Keep config for settings without a CLI flag
        self.config = config.clone();

        self
    }

    fn model_path(&self) -> PathBuf {
        self.model
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::MODEL_PATH))
    }

    fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(defaults::SERVER_URL)
    }

    fn camera_dir(&self) -> PathBuf {
        self.camera
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::CAMERA_DIR))
    }

    fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.unwrap_or(defaults::INTERVAL_SECS))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.config
                .model
                .timeout_secs
                .unwrap_or(defaults::TIMEOUT_SECS),
        )
    }

    fn backoff(&self) -> Backoff {
        let retry = &self.config.retry;
        Backoff::new(
            Duration::from_secs(retry.base_secs.unwrap_or(defaults::RETRY_BASE_SECS)),
            Duration::from_secs(retry.cap_secs.unwrap_or(defaults::RETRY_CAP_SECS)),
        )
    }

    /// Load-time inference settings: CLI thresholds, then config, then defaults.
    fn inference_config(&self) -> InferenceConfig {
        let model = &self.config.model;
        let fallback = InferenceConfig::default();

        InferenceConfig {
            confidence_threshold: self
                .confidence_threshold
                .unwrap_or(fallback.confidence_threshold),
            iou_threshold: self.iou_threshold.unwrap_or(fallback.iou_threshold),
            classes: model.classes.clone().unwrap_or(fallback.classes),
            agnostic: model.agnostic.unwrap_or(fallback.agnostic),
            multi_label: model.multi_label.unwrap_or(fallback.multi_label),
            max_det: model.max_det.unwrap_or(fallback.max_det),
            amp: model.amp.unwrap_or(fallback.amp),
        }
    }

    /// Loads the inference model and builds a stopped monitor around it.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded.
    pub fn build_monitor(&self) -> Result<PostureMonitor> {
        let model = self.load_model()?;

        let camera = DirectoryCamera::new(self.camera_dir());
        debug!("Using camera {}", camera.dir().display());

        Ok(
            PostureMonitor::new(Box::new(camera), model, self.interval())
                .with_backoff(self.backoff()),
        )
    }

    fn load_model(&self) -> Result<Arc<dyn InferenceModel>> {
        let config = self.inference_config();
        debug!("Inference config: {config:?}");

        let model = HttpInferenceModel::new(
            self.server_url(),
            self.model_path(),
            config,
            self.timeout(),
        )?
        .load()
        .context("Failed to load inference model")?;

        info!("Inference model ready");
        Ok(Arc::new(model))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold("0.25").unwrap(), 0.25);
        assert!(parse_threshold("1.5").unwrap_err().contains("0.0..=1.0"));
        assert!(parse_threshold("abc").unwrap_err().contains("not a valid number"));
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("3").unwrap(), 3);
        assert!(parse_interval("0").is_err());
        assert!(parse_interval("-1").is_err());
        assert!(parse_interval("1.5").is_err());
    }

    #[test]
    fn test_defaults_without_config() {
        let args = SharedArgs::default().with_config(&AppConfig::default());

        assert_eq!(args.model_path(), PathBuf::from(defaults::MODEL_PATH));
        assert_eq!(args.server_url(), defaults::SERVER_URL);
        assert_eq!(args.camera_dir(), PathBuf::from(defaults::CAMERA_DIR));
        assert_eq!(args.interval(), Duration::from_secs(2));
        assert_eq!(args.backoff(), Backoff::default());

        let inference = args.inference_config();
        assert_eq!(inference.confidence_threshold, 0.5);
        assert_eq!(inference.classes, vec![0, 1]);
        assert_eq!(inference.max_det, 1);
    }

    #[test]
    fn test_config_fills_unset_args() {
        let config: AppConfig = toml::from_str(
            r"
[model]
server_url = 'http://models.local:9000'
confidence_threshold = 0.7
max_det = 3

[monitor]
interval_secs = 10

[retry]
base_secs = 1
cap_secs = 60
",
        )
        .unwrap();

        let args = SharedArgs::default().with_config(&config);

        assert_eq!(args.server_url(), "http://models.local:9000");
        assert_eq!(args.interval(), Duration::from_secs(10));
        assert_eq!(
            args.backoff(),
            Backoff::new(Duration::from_secs(1), Duration::from_secs(60))
        );
        assert_eq!(args.inference_config().confidence_threshold, 0.7);
        assert_eq!(args.inference_config().max_det, 3);
    }

    #[test]
    fn test_cli_overrides_config() {
        let config: AppConfig = toml::from_str(
            r"
[model]
confidence_threshold = 0.7

[monitor]
interval_secs = 10
",
        )
        .unwrap();

        let args = SharedArgs {
            interval: Some(4),
            confidence_threshold: Some(0.3),
            ..SharedArgs::default()
        }
        .with_config(&config);

        assert_eq!(args.interval(), Duration::from_secs(4));
        assert_eq!(args.inference_config().confidence_threshold, 0.3);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["posture", "check", "--interval", "5"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Check(_))));

        let cli = Cli::try_parse_from(["posture", "--max-events", "3", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.max_events, Some(3));
        assert_eq!(cli.verbose, 2);
    }
}
