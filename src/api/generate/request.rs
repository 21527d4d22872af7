// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Form extraction for POST /api/generate

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    http::header,
    Form,
};
use axum_extra::extract::Multipart;
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::api::errors::ApiError;
use crate::generation::GenerationRequest;

/// Fields of a generate request, as submitted.
///
/// Accepts `multipart/form-data` (the only way to attach `image`) and
/// `application/x-www-form-urlencoded`. Presence checks happen in the
/// dispatcher, not here.
#[derive(Debug, Clone, Default)]
pub struct GenerateForm {
    pub model: Option<String>,
    pub prompt: Option<String>,
    pub image: Option<Bytes>,
}

#[async_trait]
impl<S> FromRequest<S> for GenerateForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                warn!("Rejected multipart request: {}", e);
                ApiError::bad_request(format!("invalid multipart body: {}", e))
            })?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(mut fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| {
                    warn!("Rejected form request: {}", e);
                    ApiError::bad_request(format!("invalid form body: {}", e))
                })?;
            Ok(Self {
                model: fields.remove("model"),
                prompt: fields.remove("prompt"),
                image: None,
            })
        } else {
            warn!("Rejected generate request with content type '{}'", content_type);
            Err(ApiError::bad_request(
                "expected a multipart/form-data or application/x-www-form-urlencoded body",
            ))
        }
    }
}

impl GenerateForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = GenerateForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "model" => form.model = Some(field.text().await.map_err(multipart_error)?),
                "prompt" => form.prompt = Some(field.text().await.map_err(multipart_error)?),
                "image" => {
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    // Browsers send an empty part when no file was chosen
                    if !bytes.is_empty() {
                        form.image = Some(bytes);
                    }
                }
                other => debug!("Ignoring form field '{}'", other),
            }
        }

        Ok(form)
    }
}

fn multipart_error(err: axum_extra::extract::multipart::MultipartError) -> ApiError {
    warn!("Failed to read multipart field: {}", err);
    ApiError::bad_request(format!("invalid multipart body: {}", err.body_text()))
}

impl From<GenerateForm> for GenerationRequest {
    fn from(form: GenerateForm) -> Self {
        GenerationRequest {
            model_selector: form.model.unwrap_or_default(),
            prompt: form.prompt.unwrap_or_default(),
            image: form.image,
        }
    }
}
