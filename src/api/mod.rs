// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod generate;
pub mod handlers;
pub mod http_server;

pub use errors::{ApiError, ErrorResponse};
pub use generate::{generate_image_handler, GenerateForm, GenerateImageResponse};
pub use handlers::{HealthResponse, ModelInfo, ModelsResponse};
pub use http_server::{create_router, start_server, AppState};
