// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod generation;
pub mod version;

pub use api::{create_router, start_server, AppState};
pub use config::{CredentialSource, EnvCredentials, ServerConfig, StaticCredentials};
pub use generation::{
    GenerationDispatcher, GenerationError, GenerationModel, GenerationRequest, ProviderFamily,
};
