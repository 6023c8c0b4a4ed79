//! HTTP inference-model adapter.
//!
//! Talks to a detection server that holds the model weights:
//!
//! - `POST {server}/v1/models/load` with the model path and the load-time
//!   [`InferenceConfig`] as JSON
//! - `POST {server}/v1/predict` with the frame as a multipart PNG upload,
//!   answered by `{"detections": [{"xmin", "ymin", "xmax", "ymax",
//!   "confidence", "class"}]}`
//!
//! Server output is post-processed locally with the same configuration, so
//! thresholds and the detection limit hold whatever the server returns.

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use image::ImageFormat;
use posture_core::inference::postprocess;
use posture_core::{Frame, InferenceConfig, InferenceModel, LoadError, RawPrediction};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, info};

/// Inference model served by a remote detection server.
pub struct HttpInferenceModel {
    client: Client,
    base_url: String,
    model_path: PathBuf,
    config: InferenceConfig,
    loaded: bool,
}

/// Body of the model load request.
#[derive(Debug, Serialize)]
struct LoadRequest<'a> {
    model_path: String,
    #[serde(flatten)]
    config: &'a InferenceConfig,
}

impl HttpInferenceModel {
    /// Creates an unloaded model client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        model_path: impl Into<PathBuf>,
        config: InferenceConfig,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model_path: model_path.into(),
            config,
            loaded: false,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl InferenceModel for HttpInferenceModel {
    fn load(mut self) -> Result<Self, LoadError> {
        let model_path = self.model_path.display().to_string();
        info!("Loading model {model_path} via {}", self.base_url);

        let request = LoadRequest {
            model_path: model_path.clone(),
            config: &self.config,
        };

        let response = self
            .client
            .post(self.url("/v1/models/load"))
            .json(&request)
            .send()
            .map_err(|e| LoadError::Transport(e.into()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LoadError::ModelNotFound { path: model_path });
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let reason = if body.trim().is_empty() {
                format!("server returned {status}")
            } else {
                format!("server returned {status}: {}", body.trim())
            };
            return Err(LoadError::Rejected { reason });
        }

        debug!("Model loaded: {:?}", self.config);
        self.loaded = true;
        Ok(self)
    }

    fn predict(&self, frame: &Frame) -> Result<RawPrediction> {
        if !self.loaded {
            anyhow::bail!("Model has not been loaded. Call load() first.");
        }

        let mut png = Cursor::new(Vec::new());
        frame
            .image
            .write_to(&mut png, ImageFormat::Png)
            .context("Failed to encode frame")?;

        let part = Part::bytes(png.into_inner())
            .file_name("frame.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("captured_at", rfc3339(frame.captured_at))
            .part("image", part);

        let body = self
            .client
            .post(self.url("/v1/predict"))
            .multipart(form)
            .send()
            .context("Prediction request failed")?
            .error_for_status()
            .context("Prediction rejected by server")?
            .text()
            .context("Failed to read prediction response")?;

        parse_prediction(&body, &self.config)
    }
}

/// Parses a server response and applies the load-time configuration.
fn parse_prediction(body: &str, config: &InferenceConfig) -> Result<RawPrediction> {
    let raw: RawPrediction =
        serde_json::from_str(body).context("Malformed prediction response")?;
    debug!("Server returned {} candidate(s)", raw.detections.len());
    Ok(postprocess(raw, config))
}

/// Formats a timestamp as RFC 3339.
fn rfc3339(at: time::OffsetDateTime) -> String {
    match at.format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn unreachable_model() -> HttpInferenceModel {
        HttpInferenceModel::new(
            "http://127.0.0.1:9/",
            "./data/models/small640.pt",
            InferenceConfig::default(),
            Duration::from_secs(2),
        )
        .unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let model = unreachable_model();
        assert_eq!(model.url("/v1/predict"), "http://127.0.0.1:9/v1/predict");
    }

    #[test]
    fn test_predict_before_load_fails() {
        let model = unreachable_model();
        let frame = Frame::new(image::DynamicImage::new_rgb8(4, 4));

        let err = model.predict(&frame).unwrap_err();
        assert!(err.to_string().contains("not been loaded"));
    }

    #[test]
    fn test_load_unreachable_server_is_transport_error() {
        let result = unreachable_model().load();
        assert!(matches!(result, Err(LoadError::Transport(_))));
    }

    #[test]
    fn test_parse_prediction_applies_config() {
        let body = r#"{
            "detections": [
                {"xmin": 10.0, "ymin": 20.0, "xmax": 110.0, "ymax": 220.0, "confidence": 0.87, "class": 0},
                {"xmin": 300.0, "ymin": 20.0, "xmax": 400.0, "ymax": 220.0, "confidence": 0.6, "class": 1},
                {"xmin": 5.0, "ymin": 5.0, "xmax": 50.0, "ymax": 50.0, "confidence": 0.2, "class": 1}
            ]
        }"#;

        let prediction = parse_prediction(body, &InferenceConfig::default()).unwrap();

        assert_eq!(prediction.detections.len(), 1);
        assert_eq!(prediction.detections[0].confidence, Some(0.87));
        assert_eq!(prediction.detections[0].class, Some(0));
    }

    #[test]
    fn test_parse_prediction_empty() {
        let prediction = parse_prediction(r#"{"detections": []}"#, &InferenceConfig::default());
        assert!(prediction.unwrap().is_empty());

        let prediction = parse_prediction("{}", &InferenceConfig::default());
        assert!(prediction.unwrap().is_empty());
    }

    #[test]
    fn test_parse_prediction_malformed() {
        let err = parse_prediction("not json", &InferenceConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Malformed"));
    }

    #[test]
    fn test_load_request_shape() {
        let config = InferenceConfig::default();
        let request = LoadRequest {
            model_path: "./model.pt".into(),
            config: &config,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model_path"], "./model.pt");
        assert_eq!(value["max_det"], 1);
        assert_eq!(value["classes"], serde_json::json!([0, 1]));
        assert_eq!(value["amp"], true);
    }
}
