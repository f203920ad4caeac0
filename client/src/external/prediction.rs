//! Prediction Service Client
//!
//! Client for the remote bean disease and image classification models.
//! Calls are made once; there is no retry or caching.

use std::path::Path;
use std::time::Duration;

use reqwest::{multipart, Client, Response};
use shared::{PredictionResult, SymptomReport};

use crate::config::PredictionConfig;
use crate::error::{InspectionError, InspectionResult};

const DISEASE_PATH: &str = "/predict_disease";
const IMAGE_PATH: &str = "/predict_image";

/// Multipart field and file metadata expected by `/predict_image`
const IMAGE_FIELD: &str = "file";
const IMAGE_FILENAME: &str = "photo.jpg";
const IMAGE_MIME: &str = "image/jpeg";

/// Client for the prediction microservice
#[derive(Clone)]
pub struct PredictionClient {
    base_url: String,
    timeout: Duration,
    http_client: Client,
}

impl PredictionClient {
    /// Create a new prediction client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> InspectionResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InspectionError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http_client,
        })
    }

    pub fn from_config(config: &PredictionConfig) -> InspectionResult<Self> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit the symptom questionnaire for a disease prediction
    pub async fn submit_symptom_report(
        &self,
        report: &SymptomReport,
    ) -> InspectionResult<PredictionResult> {
        let url = format!("{}{}", self.base_url, DISEASE_PATH);
        tracing::info!(url = %url, "Submitting symptom report");

        let response = self
            .http_client
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.parse(response).await
    }

    /// Upload a local image for classification
    pub async fn submit_image(&self, image_path: impl AsRef<Path>) -> InspectionResult<PredictionResult> {
        let image_path = image_path.as_ref();
        let bytes = tokio::fs::read(image_path).await.map_err(|e| {
            InspectionError::ImageUnavailable(format!("{}: {}", image_path.display(), e))
        })?;
        self.submit_image_bytes(bytes).await
    }

    /// Upload already-loaded JPEG bytes for classification
    pub async fn submit_image_bytes(&self, bytes: Vec<u8>) -> InspectionResult<PredictionResult> {
        let url = format!("{}{}", self.base_url, IMAGE_PATH);
        tracing::info!(url = %url, size = bytes.len(), "Submitting image");

        let part = multipart::Part::bytes(bytes)
            .file_name(IMAGE_FILENAME)
            .mime_str(IMAGE_MIME)
            .map_err(|e| InspectionError::ImageUnavailable(e.to_string()))?;
        let form = multipart::Form::new().part(IMAGE_FIELD, part);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.parse(response).await
    }

    async fn parse(&self, response: Response) -> InspectionResult<PredictionResult> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Prediction service returned an error");
            return Err(InspectionError::Service {
                status_code: status.as_u16(),
                body,
            });
        }

        response.json::<PredictionResult>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                InspectionError::InvalidResponse(format!("Failed to parse response: {}", e))
            }
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> InspectionError {
        if err.is_timeout() {
            InspectionError::Timeout(format!(
                "no response within {}s",
                self.timeout.as_secs()
            ))
        } else {
            InspectionError::Network(err.to_string())
        }
    }
}
