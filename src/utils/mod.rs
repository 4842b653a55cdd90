// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod validators;

pub use validators::{allowed_file, check_upload, is_valid_upload, ValidationError};
