// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request validation, model routing and adapter dispatch

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

use super::ark::ArkClient;
use super::error::GenerationError;
use super::gemini::GeminiClient;
use super::model::{GenerationModel, ProviderFamily};
use crate::config::{CredentialSource, ProviderCredential, ServerConfig};

/// One incoming generation call
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub model_selector: String,
    pub prompt: String,
    pub image: Option<Bytes>,
}

/// A request that passed validation and routing, ready for its adapter
#[derive(Debug)]
pub struct RoutedRequest {
    pub model: GenerationModel,
    pub credential: ProviderCredential,
    pub prompt: String,
    /// `Some` only for operations that take an input image
    pub image: Option<Bytes>,
}

/// Routes generation requests to the Gemini or Ark adapter
pub struct GenerationDispatcher {
    credentials: Arc<dyn CredentialSource>,
    gemini: GeminiClient,
    ark: ArkClient,
}

impl GenerationRequest {
    pub fn new(model_selector: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_selector: model_selector.into(),
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<Bytes>) -> Self {
        self.image = Some(image.into());
        self
    }
}

impl GenerationDispatcher {
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        gemini: GeminiClient,
        ark: ArkClient,
    ) -> Self {
        Self {
            credentials,
            gemini,
            ark,
        }
    }

    /// Build both adapters from server configuration
    pub fn from_config(
        config: &ServerConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> anyhow::Result<Self> {
        let gemini = GeminiClient::new(&config.gemini_settings())?;
        let ark = ArkClient::new(&config.ark_settings())?;
        Ok(Self::new(credentials, gemini, ark))
    }

    /// Whether a credential is currently configured for `family`
    pub fn has_credential(&self, family: ProviderFamily) -> bool {
        self.credentials.credential(family).is_some()
    }

    /// Validate the request and resolve its model and credential.
    ///
    /// Checks run in order: required fields, model selector, credential,
    /// image presence.
    pub fn route(&self, request: GenerationRequest) -> Result<RoutedRequest, GenerationError> {
        let selector = request.model_selector.as_str();
        if selector.trim().is_empty() || request.prompt.trim().is_empty() {
            return Err(GenerationError::Validation(
                "request is missing 'model' or 'prompt'".to_string(),
            ));
        }

        let model: GenerationModel = selector.parse()?;
        let family = model.family();

        let credential = self
            .credentials
            .credential(family)
            .ok_or_else(|| GenerationError::Config {
                model: selector.to_string(),
                env_key: family.credential_env_key(),
            })?;

        let image = if model.requires_image() {
            let image = request
                .image
                .filter(|bytes| !bytes.is_empty())
                .ok_or_else(|| {
                    GenerationError::Validation(format!(
                        "model '{}' requires an uploaded image",
                        model
                    ))
                })?;
            Some(image)
        } else {
            None
        };

        Ok(RoutedRequest {
            model,
            credential,
            prompt: request.prompt,
            image,
        })
    }

    /// Run one generation request end to end and return the raw image bytes
    pub async fn dispatch(&self, request: GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        let routed = self.route(request)?;
        info!(
            "Dispatching image generation: model={}, provider={}, prompt_len={}, image={}",
            routed.model,
            routed.model.family(),
            routed.prompt.len(),
            routed.image.as_ref().map(|b| b.len()).unwrap_or(0)
        );

        match (routed.model, routed.image.as_deref()) {
            (GenerationModel::GeminiI2i, Some(image)) => {
                self.gemini
                    .generate(&routed.credential, &routed.prompt, image)
                    .await
            }
            (GenerationModel::ArkT2i, _) => {
                debug!("Ark text-to-image: ignoring any uploaded image");
                self.ark.generate(&routed.credential, &routed.prompt, None).await
            }
            (GenerationModel::ArkI2i, Some(image)) => {
                self.ark
                    .generate(&routed.credential, &routed.prompt, Some(image))
                    .await
            }
            // route() guarantees an image for image-to-image models
            (model, None) => Err(GenerationError::Validation(format!(
                "model '{}' requires an uploaded image",
                model
            ))),
        }
    }
}
