// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding model layer
//!
//! The HTTP layer only sees [`EmbeddingEncoder`]: a blocking
//! `encode(texts, normalize, batch_size)` over a model loaded once at startup.

pub mod deterministic;
pub mod model_source;
pub mod onnx_model;
pub mod pooling;

pub use deterministic::DeterministicEncoder;
pub use model_source::{ModelFiles, ModelSource};
pub use onnx_model::{OnnxEmbeddingModel, OnnxModelOptions};
pub use pooling::{l2_normalize, pool_hidden_states, PoolingStrategy};

use crate::config::{Backend, ServiceConfig};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tracing::info;

/// Batch size used when the caller gives no hint
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// A loaded text-embedding model
///
/// `encode` is synchronous and may block for the whole inference; async
/// callers should move it onto a blocking thread.
pub trait EmbeddingEncoder: Send + Sync {
    /// Returns one vector per input text, in input order
    ///
    /// `batch_size` only controls how many texts go through the model per
    /// forward pass; it never changes the output values, order or count.
    fn encode(
        &self,
        texts: &[String],
        normalize: bool,
        batch_size: Option<usize>,
    ) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector returned by `encode`
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model
    fn model_name(&self) -> &str;
}

/// Splits texts into consecutive chunks of at most `batch_size` items
pub fn chunk_texts(
    texts: &[String],
    batch_size: Option<usize>,
) -> Result<std::slice::Chunks<'_, String>> {
    let batch_size = batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
    if batch_size == 0 {
        return Err(anyhow!("Batch size must be greater than 0"));
    }
    Ok(texts.chunks(batch_size))
}

/// Builds the encoder selected by the service configuration
///
/// Any failure here is fatal to startup: the server never binds without a
/// loaded model.
pub async fn load_encoder(config: &ServiceConfig) -> Result<Arc<dyn EmbeddingEncoder>> {
    match config.backend {
        Backend::Deterministic => {
            info!(
                "Using deterministic encoder ({} dimensions), no model is loaded",
                config.dimensions
            );
            let encoder = DeterministicEncoder::new(config.model_repo.clone(), config.dimensions)?;
            Ok(Arc::new(encoder))
        }
        Backend::Onnx => {
            let files = config.model_source().resolve().await?;
            let options = OnnxModelOptions {
                model_name: config.model_repo.clone(),
                dimension: config.dimensions,
                max_length: config.max_length,
                pooling: config.pooling,
                intra_threads: config.intra_threads,
            };

            let model = tokio::task::spawn_blocking(move || {
                OnnxEmbeddingModel::load(&files.model_path, &files.tokenizer_path, options)
            })
            .await
            .context("Model loading task failed")??;

            Ok(Arc::new(model))
        }
    }
}
