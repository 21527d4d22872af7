// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, error, info, warn};

use super::request::GenerateForm;
use super::response::GenerateImageResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;

/// POST /api/generate - Generate an image with the selected provider
///
/// Pipeline:
/// 1. Extract `model`, `prompt` and optional `image` from the form
/// 2. Validate and route via the dispatcher (400 on bad input or missing key)
/// 3. Call Gemini or Ark
/// 4. Return `{"imageData": <base64>}`, or `{"error": ...}` with 400/500
pub async fn generate_image_handler(
    State(state): State<AppState>,
    form: GenerateForm,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let selector = form.model.clone().unwrap_or_default();
    debug!(
        "Image generation request received: model={}, prompt_len={}, image_bytes={}",
        selector,
        form.prompt.as_ref().map(|p| p.len()).unwrap_or(0),
        form.image.as_ref().map(|i| i.len()).unwrap_or(0)
    );

    match state.dispatcher.dispatch(form.into()).await {
        Ok(bytes) => {
            info!(
                "Image generated: model={}, {} bytes, returning to client",
                selector,
                bytes.len()
            );
            Ok(Json(GenerateImageResponse::from_image_bytes(&bytes)))
        }
        Err(e) => {
            if e.is_client_error() {
                warn!("Image generation rejected: model={}, error={}", selector, e);
            } else {
                error!(
                    "Image generation failed: model={}, status={}, error={}",
                    selector,
                    e.status_code(),
                    e
                );
            }
            Err(ApiError::from(e))
        }
    }
}
