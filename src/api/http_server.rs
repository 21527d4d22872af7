// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::generate::generate_image_handler;
use super::handlers::{health_handler, models_handler};
use crate::config::{CredentialSource, ServerConfig};
use crate::generation::GenerationDispatcher;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<GenerationDispatcher>,
}

impl AppState {
    pub fn new(dispatcher: GenerationDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn from_config(
        config: &ServerConfig,
        credentials: Arc<dyn CredentialSource>,
    ) -> Result<Self> {
        Ok(Self::new(GenerationDispatcher::from_config(
            config,
            credentials,
        )?))
    }
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/models", get(models_handler))
        .route("/api/generate", post(generate_image_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

pub async fn start_server(config: ServerConfig, credentials: Arc<dyn CredentialSource>) -> Result<()> {
    let state = AppState::from_config(&config, credentials)?;
    let app = create_router(state, config.max_upload_bytes);

    let addr = config.listen_addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Image proxy listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Image proxy stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
