// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod uploads;

pub use uploads::{processed_path_for, StoredUpload, UploadError, UploadStore, PROCESSED_SUFFIX};
