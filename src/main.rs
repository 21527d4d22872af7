// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use fabstir_image_proxy::{
    api::start_server,
    config::{CredentialSource, EnvCredentials},
    version, ProviderFamily, ServerConfig,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GOOGLE_API_KEY / ARK_API_KEY and server options from .env when present
    let dotenv_loaded = dotenv::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting {}", version::get_version_string());
    if !dotenv_loaded {
        info!("No .env file found, using process environment only");
    }

    let config = ServerConfig::parse();
    info!(
        "Configuration: listen_addr={}, max_upload_bytes={}, generation_timeout={}s, download_timeout={}s",
        config.listen_addr,
        config.max_upload_bytes,
        config.generation_timeout_secs,
        config.download_timeout_secs
    );

    let credentials = EnvCredentials;
    for family in [ProviderFamily::Gemini, ProviderFamily::Ark] {
        if credentials.credential(family).is_none() {
            warn!(
                "{} is not set; {} requests will be rejected until it is",
                family.credential_env_key(),
                family
            );
        }
    }

    start_server(config, Arc::new(credentials)).await
}
