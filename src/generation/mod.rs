// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation through third-party providers (Gemini, Ark)

pub mod ark;
pub mod dispatcher;
pub mod error;
pub mod gemini;
pub mod image_utils;
pub mod model;

pub use ark::{ArkClient, ArkRequest, ArkResponse};
pub use dispatcher::{GenerationDispatcher, GenerationRequest, RoutedRequest};
pub use error::{GenerationError, UpstreamError};
pub use gemini::{GeminiClient, GeminiRequest, GeminiResponse};
pub use image_utils::ImageError;
pub use model::{GenerationModel, ProviderFamily};
