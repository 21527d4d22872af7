// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Provider API key lookup

use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt;

use crate::generation::ProviderFamily;

/// API key for one provider family, redacted in Debug output
pub struct ProviderCredential(SecretString);

impl ProviderCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderCredential([REDACTED])")
    }
}

/// Where the dispatcher gets API keys from. Looked up on every request.
pub trait CredentialSource: Send + Sync {
    fn credential(&self, family: ProviderFamily) -> Option<ProviderCredential>;
}

/// Reads `GOOGLE_API_KEY` / `ARK_API_KEY` from the process environment at call time
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn credential(&self, family: ProviderFamily) -> Option<ProviderCredential> {
        env::var(family.credential_env_key())
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(ProviderCredential::new)
    }
}

/// Fixed keys, for tests and embedding
#[derive(Default)]
pub struct StaticCredentials {
    gemini: Option<SecretString>,
    ark: Option<SecretString>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gemini(mut self, key: impl Into<String>) -> Self {
        self.gemini = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_ark(mut self, key: impl Into<String>) -> Self {
        self.ark = Some(SecretString::from(key.into()));
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn credential(&self, family: ProviderFamily) -> Option<ProviderCredential> {
        let slot = match family {
            ProviderFamily::Gemini => self.gemini.as_ref(),
            ProviderFamily::Ark => self.ark.as_ref(),
        };
        slot.map(|secret| secret.expose_secret())
            .filter(|value| !value.is_empty())
            .map(ProviderCredential::new)
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("gemini", &self.gemini.is_some())
            .field("ark", &self.ark.is_some())
            .finish()
    }
}
