// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error taxonomy for image generation requests

use serde_json::Value;
use thiserror::Error;

use super::image_utils::ImageError;
use super::model::ProviderFamily;

/// Longest upstream detail carried into a client-facing message
pub const MAX_DETAIL_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),

    #[error("API key for model '{model}' is not configured (set {env_key})")]
    Config { model: String, env_key: &'static str },

    #[error("unknown model identifier: {0}")]
    UnknownModel(String),

    #[error("request blocked for safety reasons: {0}")]
    ContentBlocked(String),

    #[error("{0} returned no usable image")]
    EmptyResponse(ProviderFamily),

    #[error("{provider} request failed: {source}")]
    Upstream {
        provider: ProviderFamily,
        #[source]
        source: UpstreamError,
    },
}

/// Failures talking to (or reported by) a provider
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("request timed out")]
    Timeout,

    #[error("provider reported an error: {0}")]
    Reported(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid input image: {0}")]
    InvalidImage(#[from] ImageError),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl GenerationError {
    pub fn upstream(provider: ProviderFamily, source: UpstreamError) -> Self {
        GenerationError::Upstream { provider, source }
    }

    /// HTTP status the error maps to at the API boundary
    pub fn status_code(&self) -> u16 {
        match self {
            GenerationError::Validation(_)
            | GenerationError::Config { .. }
            | GenerationError::UnknownModel(_) => 400,
            GenerationError::ContentBlocked(_)
            | GenerationError::EmptyResponse(_)
            | GenerationError::Upstream { .. } => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl UpstreamError {
    /// Classify a transport failure from reqwest
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            // Drop the URL; the download URL is provider-signed
            UpstreamError::Network(err.without_url().to_string())
        }
    }

    /// Classify a non-2xx response status with its (already truncated) body detail
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            429 => UpstreamError::RateLimited(detail),
            504 => UpstreamError::Timeout,
            _ => UpstreamError::Status { status, detail },
        }
    }

    /// HTTP status reported by the provider, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::RateLimited(_) => Some(429),
            _ => None,
        }
    }

    /// Rate limits and timeouts are worth retrying by the caller
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            UpstreamError::RateLimited(_) | UpstreamError::Timeout | UpstreamError::Network(_)
        )
    }
}

/// Shorten provider-supplied text before it reaches a client message
pub fn truncate_detail(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.chars().count() <= MAX_DETAIL_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_DETAIL_CHARS).collect();
    out.push_str("...");
    out
}

/// Render a provider `error` value: strings as-is, `{message, code}` objects
/// as `code: message`, anything else as compact JSON
pub fn describe_error_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let message = map.get("message").and_then(Value::as_str);
            let code = map
                .get("code")
                .or_else(|| map.get("status"))
                .and_then(|c| match c {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                });
            match (code, message) {
                (Some(code), Some(message)) => format!("{}: {}", code, message),
                (None, Some(message)) => message.to_string(),
                _ => value.to_string(),
            }
        }
        other => other.to_string(),
    }
}

/// Short detail for a non-2xx response body, preferring the JSON `error` field
pub fn detail_from_body(body: &str) -> String {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(json) => match json.get("error").or_else(|| json.get("message")) {
            Some(err) => describe_error_value(err),
            None => body.to_string(),
        },
        Err(_) => body.to_string(),
    };
    truncate_detail(&detail)
}
