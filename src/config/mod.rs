// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration and provider credential lookup

pub mod credentials;

pub use credentials::{CredentialSource, EnvCredentials, ProviderCredential, StaticCredentials};

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:10000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image-preview";

pub const DEFAULT_ARK_ENDPOINT: &str = "https://ark.cn-beijing.volces.com/api/v3/images/generations";
pub const DEFAULT_ARK_MODEL: &str = "doubao-seedream-4-0-250828";

pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 60;

/// Fabstir Image Proxy server options
///
/// API keys are not part of this struct; they are read from
/// `GOOGLE_API_KEY` / `ARK_API_KEY` on every request.
#[derive(Parser, Debug, Clone)]
#[command(name = "fabstir-image-proxy")]
#[command(about = "Proxy image generation requests to Gemini and Ark", long_about = None)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to
    #[arg(long, env = "LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: String,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Gemini REST API base URL
    #[arg(long, env = "GEMINI_API_BASE", default_value = DEFAULT_GEMINI_API_BASE)]
    pub gemini_api_base: String,

    /// Gemini model used for gemini_i2i
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Ark image generation endpoint
    #[arg(long, env = "ARK_ENDPOINT", default_value = DEFAULT_ARK_ENDPOINT)]
    pub ark_endpoint: String,

    /// Ark model used for ark_t2i / ark_i2i
    #[arg(long, env = "ARK_MODEL", default_value = DEFAULT_ARK_MODEL)]
    pub ark_model: String,

    /// Timeout for generation calls, in seconds
    #[arg(long, env = "GENERATION_TIMEOUT_SECS", default_value_t = DEFAULT_GENERATION_TIMEOUT_SECS)]
    pub generation_timeout_secs: u64,

    /// Timeout for downloading a generated image, in seconds
    #[arg(long, env = "DOWNLOAD_TIMEOUT_SECS", default_value_t = DEFAULT_DOWNLOAD_TIMEOUT_SECS)]
    pub download_timeout_secs: u64,
}

/// Settings for the Gemini adapter
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_base: String,
    pub model: String,
    pub timeout: Duration,
}

/// Settings for the Ark adapter
#[derive(Debug, Clone)]
pub struct ArkSettings {
    pub endpoint: String,
    pub model: String,
    pub generation_timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            ark_endpoint: DEFAULT_ARK_ENDPOINT.to_string(),
            ark_model: DEFAULT_ARK_MODEL.to_string(),
            generation_timeout_secs: DEFAULT_GENERATION_TIMEOUT_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            api_base: self.gemini_api_base.trim_end_matches('/').to_string(),
            model: self.gemini_model.clone(),
            timeout: Duration::from_secs(self.generation_timeout_secs),
        }
    }

    pub fn ark_settings(&self) -> ArkSettings {
        ArkSettings {
            endpoint: self.ark_endpoint.clone(),
            model: self.ark_model.clone(),
            generation_timeout: Duration::from_secs(self.generation_timeout_secs),
            download_timeout: Duration::from_secs(self.download_timeout_secs),
        }
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        ServerConfig::default().gemini_settings()
    }
}

impl Default for ArkSettings {
    fn default() -> Self {
        ServerConfig::default().ark_settings()
    }
}
