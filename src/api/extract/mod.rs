// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction endpoints
//!
//! - POST /api/v1/extract/paddle
//! - POST /api/v1/extract/easy
//! - POST /api/v1/extract/compare

pub mod handler;
pub mod response;

pub use handler::{extract_compare_handler, extract_easy_handler, extract_paddle_handler};
pub use response::{CompareResponse, ExtractResponse};
