// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Ark (Seedream) adapter: text-to-image and image-to-image
//!
//! Ark answers with a URL, so every generation is two sequential calls:
//! POST the generation request, then GET the image it points at.

use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::error::{describe_error_value, detail_from_body, GenerationError, UpstreamError};
use super::image_utils::to_data_uri;
use super::model::ProviderFamily;
use crate::config::{ArkSettings, ProviderCredential};

const FAMILY: ProviderFamily = ProviderFamily::Ark;

/// Requested output size
pub const ARK_OUTPUT_SIZE: &str = "2K";

/// Client for the Ark image generations API
pub struct ArkClient {
    client: Client,
    endpoint: String,
    model_name: String,
    generation_timeout: Duration,
    download_timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArkRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub sequential_image_generation: String,
    pub stream: bool,
    pub response_format: String,
    pub watermark: bool,
    /// `data:image/<fmt>;base64,...`; only set for image-to-image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArkResponse {
    #[serde(default)]
    pub data: Option<Vec<ArkImageData>>,
    /// `Some` whenever the key is present, including `"error": null`
    #[serde(default, deserialize_with = "present_value")]
    pub error: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct ArkImageData {
    #[serde(default)]
    pub url: Option<String>,
}

impl ArkRequest {
    pub fn new(model: &str, prompt: &str, image: Option<&[u8]>) -> Self {
        Self {
            model: model.to_string(),
            prompt: prompt.to_string(),
            size: ARK_OUTPUT_SIZE.to_string(),
            sequential_image_generation: "disabled".to_string(),
            stream: false,
            response_format: "url".to_string(),
            watermark: false,
            image: image.map(to_data_uri),
        }
    }
}

impl ArkResponse {
    /// URL of the first generated image, or the provider's reported error
    pub fn into_image_url(self) -> Result<String, GenerationError> {
        if let Some(error) = self.error {
            return Err(GenerationError::upstream(
                FAMILY,
                UpstreamError::Reported(describe_error_value(&error)),
            ));
        }

        self.data
            .and_then(|data| data.into_iter().next())
            .and_then(|first| first.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse(FAMILY))
    }
}

impl ArkClient {
    pub fn new(settings: &ArkSettings) -> anyhow::Result<Self> {
        // Per-call timeouts are set on each request
        let client = Client::builder().build()?;

        info!(
            "Ark client configured: endpoint={}, model={}",
            settings.endpoint, settings.model
        );

        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            model_name: settings.model.clone(),
            generation_timeout: settings.generation_timeout,
            download_timeout: settings.download_timeout,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate an image; `image` switches between text-to-image and image-to-image
    pub async fn generate(
        &self,
        credential: &ProviderCredential,
        prompt: &str,
        image: Option<&[u8]>,
    ) -> Result<Vec<u8>, GenerationError> {
        match image {
            Some(bytes) => debug!("Ark image-to-image request ({} bytes input)", bytes.len()),
            None => debug!("Ark text-to-image request"),
        }

        let start = Instant::now();
        let body = ArkRequest::new(&self.model_name, prompt, image);
        let image_url = self.request_generation(credential, &body).await?;
        debug!("Ark returned image URL, downloading");

        let bytes = self.download(&image_url).await?;
        info!(
            "Ark image generated: model={}, {} bytes, {}ms",
            self.model_name,
            bytes.len(),
            start.elapsed().as_millis()
        );
        Ok(bytes)
    }

    async fn request_generation(
        &self,
        credential: &ProviderCredential,
        body: &ArkRequest,
    ) -> Result<String, GenerationError> {
        debug!("Ark generate POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .timeout(self.generation_timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::upstream(FAMILY, UpstreamError::from_transport(e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Ark returned {}", status);
            return Err(GenerationError::upstream(
                FAMILY,
                UpstreamError::from_status(status.as_u16(), detail_from_body(&text)),
            ));
        }

        let api_response: ArkResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::upstream(FAMILY, UpstreamError::from_transport(e)))?;

        api_response.into_image_url()
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| GenerationError::upstream(FAMILY, UpstreamError::from_transport(e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Ark image download returned {}", status);
            return Err(GenerationError::upstream(
                FAMILY,
                UpstreamError::from_status(
                    status.as_u16(),
                    "image download failed".to_string(),
                ),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::upstream(FAMILY, UpstreamError::from_transport(e)))?;

        Ok(bytes.to_vec())
    }
}
