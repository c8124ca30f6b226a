// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir Embedding Service

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-bge-large-2025-10-17";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-10-17";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "single-embed",
    "batch-embed",
    "onnx-runtime",
    "cuda-fallback",
    "huggingface-hub",
    "cls-pooling",
    "mean-pooling",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Embedding Service {} ({})", VERSION_NUMBER, BUILD_DATE)
}
