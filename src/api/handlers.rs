// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::generation::GenerationModel;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub requires_image: bool,
    /// Whether an API key for the provider is configured right now
    pub available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: version::VERSION_NUMBER.to_string(),
        features: version::FEATURES.iter().map(|f| f.to_string()).collect(),
    })
}

/// GET /v1/models - Supported model selectors and whether they can be served
pub async fn models_handler(State(state): State<AppState>) -> Json<ModelsResponse> {
    let models = GenerationModel::ALL
        .iter()
        .map(|model| ModelInfo {
            id: model.selector().to_string(),
            provider: model.family().tag().to_string(),
            requires_image: model.requires_image(),
            available: state.dispatcher.has_credential(model.family()),
        })
        .collect();

    Json(ModelsResponse { models })
}
