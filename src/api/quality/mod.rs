// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image quality endpoint
//!
//! Provides POST /api/v1/analyze/quality.

pub mod handler;
pub mod response;

pub use handler::quality_handler;
pub use response::QualityResponse;
