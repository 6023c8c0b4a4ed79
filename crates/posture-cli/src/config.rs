//! Configuration file support for posture.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/posture/config.toml` (lowest priority)
//! - Project-local: `.posture.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)
//!
//! Configuration is read before logging is set up, since it may choose the
//! log level. Problems are printed as warnings on stderr.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Accepted values for `log.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Inference model settings.
    pub model: ModelConfig,
    /// Sampling loop settings.
    pub monitor: MonitorConfig,
    /// Camera retry backoff.
    pub retry: RetryConfig,
    /// Camera device.
    pub camera: CameraConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
    /// Logging settings.
    pub log: LogConfig,
    /// Files this configuration was read from, lowest priority first.
    #[serde(skip)]
    pub sources: Vec<PathBuf>,
}

/// Inference model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model weights path, as known to the inference server.
    pub path: Option<PathBuf>,
    /// Inference server base URL.
    pub server_url: Option<String>,
    /// Minimum detection confidence (0.0-1.0).
    pub confidence_threshold: Option<f32>,
    /// IoU threshold for suppressing overlapping boxes (0.0-1.0).
    pub iou_threshold: Option<f32>,
    /// Class labels to keep.
    pub classes: Option<Vec<i64>>,
    /// Suppress overlaps across classes.
    pub agnostic: Option<bool>,
    /// Allow several labels per box.
    pub multi_label: Option<bool>,
    /// Maximum detections per frame.
    pub max_det: Option<usize>,
    /// Mixed-precision inference.
    pub amp: Option<bool>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Sampling loop configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between samples.
    pub interval_secs: Option<u64>,
}

/// Retry backoff configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// First retry delay in seconds.
    pub base_secs: Option<u64>,
    /// Longest retry delay in seconds.
    pub cap_secs: Option<u64>,
}

/// Camera configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Frames directory backing the camera.
    pub device: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show the status line.
    pub status: Option<bool>,
}

/// Logging configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level used without `-v` flags.
    pub level: Option<String>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/posture/config.toml`
    /// 2. Project-local: `.posture.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Unreadable files are skipped with a
    /// warning. If the merged values are invalid, a warning is printed and
    /// the files are ignored.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                    config.sources.push(xdg_path);
                }
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
                config.sources.push(project_path);
            }
        }

        // Validate merged config
        if let Err(e) = config.validate() {
            eprintln!("warning: {e}; ignoring configuration files");
            return Self::default();
        }

        config
    }

    /// Log level to use when no `-v` flag is given.
    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or("warn")
    }

    /// Validate configuration values are within acceptable ranges.
    fn validate(&self) -> Result<(), String> {
        // Threshold validations (0.0-1.0 range)
        if let Some(t) = self.model.confidence_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!(
                    "model.confidence_threshold must be 0.0-1.0, got {t}"
                ));
            }
        }
        if let Some(t) = self.model.iou_threshold {
            if !(0.0..=1.0).contains(&t) {
                return Err(format!("model.iou_threshold must be 0.0-1.0, got {t}"));
            }
        }
        if self.model.timeout_secs == Some(0) {
            return Err(String::from("model.timeout_secs must be at least 1"));
        }

        if self.monitor.interval_secs == Some(0) {
            return Err(String::from("monitor.interval_secs must be at least 1"));
        }

        let base = self.retry.base_secs.unwrap_or(5);
        let cap = self.retry.cap_secs.unwrap_or(600);
        if base == 0 {
            return Err(String::from("retry.base_secs must be at least 1"));
        }
        if base > cap {
            return Err(format!(
                "retry.base_secs ({base}) must not exceed retry.cap_secs ({cap})"
            ));
        }

        if let Some(ref level) = self.log.level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(format!(
                    "log.level must be one of {}, got '{level}'",
                    LOG_LEVELS.join("/")
                ));
            }
        }

        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Model
        self.model.path = other.model.path.or_else(|| self.model.path.take());
        self.model.server_url = other
            .model
            .server_url
            .or_else(|| self.model.server_url.take());
        self.model.confidence_threshold = other
            .model
            .confidence_threshold
            .or(self.model.confidence_threshold);
        self.model.iou_threshold = other.model.iou_threshold.or(self.model.iou_threshold);
        self.model.classes = other.model.classes.or_else(|| self.model.classes.take());
        self.model.agnostic = other.model.agnostic.or(self.model.agnostic);
        self.model.multi_label = other.model.multi_label.or(self.model.multi_label);
        self.model.max_det = other.model.max_det.or(self.model.max_det);
        self.model.amp = other.model.amp.or(self.model.amp);
        self.model.timeout_secs = other.model.timeout_secs.or(self.model.timeout_secs);

        // Monitor and retry
        self.monitor.interval_secs = other.monitor.interval_secs.or(self.monitor.interval_secs);
        self.retry.base_secs = other.retry.base_secs.or(self.retry.base_secs);
        self.retry.cap_secs = other.retry.cap_secs.or(self.retry.cap_secs);

        // Camera
        self.camera.device = other.camera.device.or_else(|| self.camera.device.take());

        // Output
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.status = other.output.status.or(self.output.status);

        // Log
        self.log.level = other.log.level.or_else(|| self.log.level.take());
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("posture").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.posture.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".posture.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("warning: failed to read config file {}: {e}", path.display());
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("warning: failed to parse config file {}: {e}", path.display());
            None
        }
    }
}
