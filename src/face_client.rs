//! Client for the external face detection API

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Detection, Face};

/// Capability interface for face detection.
#[async_trait]
pub trait DetectionClient: Send + Sync {
    /// Detect faces in an encoded image.
    ///
    /// Returns the detection result, or a classified failure: zero faces is
    /// [`Error::NoFacesFound`], a non-success remote status is
    /// [`Error::UpstreamError`], and a transport failure is
    /// [`Error::Unreachable`]. No retries are performed.
    async fn detect(&self, image: &[u8]) -> Result<Detection>;
}

/// Client for the remote face detection HTTP API
pub struct FaceApiClient {
    endpoint: String,
    api_key: String,
    api_secret: String,
    client: reqwest::Client,
}

/// Success body of the detection API
#[derive(Debug, Deserialize)]
struct DetectResponse {
    #[serde(default)]
    image_id: Option<String>,
    #[serde(default)]
    request_id: String,
    #[serde(default)]
    time_used: u64,
    #[serde(default)]
    faces: Vec<Face>,
}

/// Error body of the detection API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

impl FaceApiClient {
    /// Create a new detection client
    pub fn new(
        endpoint: String,
        api_key: String,
        api_secret: String,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build detection HTTP client")?;

        Ok(Self {
            endpoint,
            api_key,
            api_secret,
            client,
        })
    }
}

#[async_trait]
impl DetectionClient for FaceApiClient {
    async fn detect(&self, image: &[u8]) -> Result<Detection> {
        let image_base64 = general_purpose::STANDARD.encode(image);

        debug!("Sending {} byte image to {}", image.len(), self.endpoint);

        let form = [
            ("api_key", self.api_key.as_str()),
            ("api_secret", self.api_secret.as_str()),
            ("image_base64", image_base64.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|err| Error::Unreachable(err.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| Error::Unreachable(err.to_string()))?;

        debug!("Detection service responded with status {}", status);

        classify_response(status, &body)
    }
}

/// Classify a raw detection response into a [`Detection`] or a failure.
fn classify_response(status: u16, body: &str) -> Result<Detection> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error_message)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(Error::UpstreamError {
            code: status,
            message,
        });
    }

    let response: DetectResponse = serde_json::from_str(body).map_err(|err| Error::UpstreamError {
        code: status,
        message: format!("malformed detection response: {err}"),
    })?;

    if response.faces.is_empty() {
        return Err(Error::NoFacesFound);
    }

    Ok(Detection {
        image_id: response
            .image_id
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        request_id: response.request_id,
        time_used: response.time_used,
        faces: response.faces,
    })
}
