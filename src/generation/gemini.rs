// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gemini adapter: image + prompt to image via `generateContent`

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::error::{detail_from_body, GenerationError, UpstreamError};
use super::image_utils::validate_image_bytes;
use super::model::ProviderFamily;
use crate::config::{GeminiSettings, ProviderCredential};

const FAMILY: ProviderFamily = ProviderFamily::Gemini;

/// Client for the Gemini REST API
pub struct GeminiClient {
    client: Client,
    api_base: String,
    model_name: String,
    timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "inline_data")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, alias = "mime_type")]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub response_modalities: Vec<String>,
}

// --- Response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default, alias = "prompt_feedback")]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, alias = "block_reason")]
    pub block_reason: Option<String>,
}

impl GeminiRequest {
    /// Prompt text followed by the uploaded image, asking for image output only
    pub fn new(prompt: &str, mime_type: &str, image: &[u8]) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![
                    GeminiPart {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    GeminiPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: mime_type.to_string(),
                            data: STANDARD.encode(image),
                        }),
                    },
                ],
            }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

impl GeminiResponse {
    /// Pull the generated image out of the first part of the first candidate
    pub fn into_image_bytes(self) -> Result<Vec<u8>, GenerationError> {
        if let Some(reason) = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .filter(|reason| !reason.is_empty())
        {
            return Err(GenerationError::ContentBlocked(reason));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(GenerationError::EmptyResponse(FAMILY))?;
        let finish_reason = candidate.finish_reason;

        let data = candidate
            .content
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.inline_data)
            .map(|inline| inline.data)
            .filter(|data| !data.is_empty())
            .ok_or_else(|| {
                warn!(
                    "Gemini answered without an inline image (finish_reason={})",
                    finish_reason.as_deref().unwrap_or("unknown")
                );
                GenerationError::EmptyResponse(FAMILY)
            })?;

        let bytes = STANDARD.decode(data.as_bytes()).map_err(|e| {
            GenerationError::upstream(
                FAMILY,
                UpstreamError::Decode(format!("inline image is not valid base64: {}", e)),
            )
        })?;

        if bytes.is_empty() {
            return Err(GenerationError::EmptyResponse(FAMILY));
        }
        Ok(bytes)
    }
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        let api_base = settings.api_base.trim_end_matches('/').to_string();
        info!(
            "Gemini client configured: api_base={}, model={}",
            api_base, settings.model
        );

        Ok(Self {
            client,
            api_base,
            model_name: settings.model.clone(),
            timeout: settings.timeout,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn endpoint(&self) -> String {
        let model_path = if self.model_name.starts_with("models/") {
            self.model_name.clone()
        } else {
            format!("models/{}", self.model_name)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    /// Generate an image from a prompt and an input image. Single attempt.
    pub async fn generate(
        &self,
        credential: &ProviderCredential,
        prompt: &str,
        image: &[u8],
    ) -> Result<Vec<u8>, GenerationError> {
        let info = validate_image_bytes(image)
            .map_err(|e| GenerationError::upstream(FAMILY, UpstreamError::from(e)))?;
        debug!(
            "Gemini input image: {}x{} {} ({} bytes)",
            info.width,
            info.height,
            info.mime_type(),
            info.size_bytes
        );

        let body = GeminiRequest::new(prompt, &info.mime_type(), image);
        let url = self.endpoint();
        let start = Instant::now();
        debug!("Gemini generate POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::upstream(FAMILY, UpstreamError::from_transport(e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Gemini returned {}", status);
            return Err(GenerationError::upstream(
                FAMILY,
                UpstreamError::from_status(status.as_u16(), detail_from_body(&text)),
            ));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::upstream(FAMILY, UpstreamError::from_transport(e)))?;

        let bytes = api_response.into_image_bytes()?;
        info!(
            "Gemini image generated: model={}, {} bytes, {}ms",
            self.model_name,
            bytes.len(),
            start.elapsed().as_millis()
        );
        Ok(bytes)
    }
}
