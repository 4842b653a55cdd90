// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod http_server;
pub mod quality;
pub mod upload;

pub use errors::{ApiError, ErrorResponse};
pub use extract::{CompareResponse, ExtractResponse};
pub use handlers::{health_handler, HealthResponse};
pub use http_server::{create_app, start_server, AppState};
pub use quality::QualityResponse;
