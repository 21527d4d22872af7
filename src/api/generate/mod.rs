// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image generation API endpoint module
//!
//! Provides POST /api/generate for Gemini and Ark image generation.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::generate_image_handler;
pub use request::GenerateForm;
pub use response::GenerateImageResponse;
