// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation response types

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

/// Response from image generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    /// Base64-encoded generated image
    pub image_data: String,
}

impl GenerateImageResponse {
    pub fn from_image_bytes(bytes: &[u8]) -> Self {
        Self {
            image_data: STANDARD.encode(bytes),
        }
    }
}
