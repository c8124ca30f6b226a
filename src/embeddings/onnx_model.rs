// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! This module provides a wrapper around ONNX Runtime for running a
//! sentence-transformer export such as BGE-large-en-v1.5.
//!
//! Features:
//! - ONNX model loading from disk
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - Tokenization with truncation to the model's max sequence length
//! - Chunked batch inference driven by a caller-supplied batch size
//! - CLS or attention-masked mean pooling
//! - Optional L2 normalization

use super::{chunk_texts, l2_normalize, pool_hidden_states, EmbeddingEncoder, PoolingStrategy};
use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, Ix3};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Encoding, Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// Load-time settings for [`OnnxEmbeddingModel`]
#[derive(Debug, Clone)]
pub struct OnnxModelOptions {
    /// Model identifier reported by the encoder (e.g. "BAAI/bge-large-en-v1.5")
    pub model_name: String,
    /// Expected hidden size; validated against a probe inference
    pub dimension: usize,
    /// Tokenizer truncation length
    pub max_length: usize,
    pub pooling: PoolingStrategy,
    /// ONNX Runtime intra-op thread count
    pub intra_threads: usize,
}

impl Default for OnnxModelOptions {
    fn default() -> Self {
        Self {
            model_name: "BAAI/bge-large-en-v1.5".to_string(),
            dimension: 1024,
            max_length: 512,
            pooling: PoolingStrategy::Cls,
            intra_threads: 4,
        }
    }
}

/// ONNX-based embedding model
///
/// Wraps an ONNX Runtime session and a HuggingFace tokenizer. The session is
/// behind a mutex because `Session::run` needs exclusive access; concurrent
/// requests queue on it.
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    pooling: PoolingStrategy,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("pooling", &self.pooling)
            .finish_non_exhaustive()
    }
}

/// Padded `[rows, max_len]` model inputs for one chunk
struct BatchInputs {
    rows: usize,
    max_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
}

impl OnnxEmbeddingModel {
    /// Loads the ONNX graph and tokenizer from disk
    ///
    /// # Errors
    /// Returns error if:
    /// - Model or tokenizer file not found or invalid
    /// - ONNX Runtime initialization fails on both CUDA and CPU
    /// - The model's hidden size differs from `options.dimension`
    pub fn load(
        model_path: impl AsRef<Path>,
        tokenizer_path: impl AsRef<Path>,
        options: OnnxModelOptions,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }
        if options.dimension == 0 {
            anyhow::bail!("Embedding dimension must be greater than 0");
        }

        info!("🚀 Initializing ONNX embedding model {}", options.model_name);

        let session = build_session(model_path, options.intra_threads)?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure tokenizer truncation: {}", e))?;

        let model = Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name: options.model_name,
            dimension: options.dimension,
            pooling: options.pooling,
        };

        // Probe inference validates the hidden size before serving traffic
        let probe = model
            .encode(&["validation test".to_string()], false, Some(1))
            .context("Model validation inference failed")?;
        let probe_dim = probe.first().map(Vec::len).unwrap_or(0);
        if probe_dim != model.dimension {
            anyhow::bail!(
                "Model outputs {} dimensions (expected {})",
                probe_dim,
                model.dimension
            );
        }

        info!(
            "✅ ONNX embedding model loaded ({} dimensions, {} pooling)",
            model.dimension, model.pooling
        );

        Ok(model)
    }

    fn tokenize(&self, texts: &[String]) -> Result<BatchInputs> {
        let encodings: Vec<Encoding> = texts
            .iter()
            .map(|text| {
                self.tokenizer
                    .encode(text.as_str(), true)
                    .map_err(|e| anyhow!("Tokenization failed: {}", e))
            })
            .collect::<Result<Vec<_>>>()?;

        let max_len = encodings
            .iter()
            .map(|enc| enc.get_ids().len())
            .max()
            .unwrap_or(0)
            .max(1);

        let capacity = texts.len() * max_len;
        let mut input_ids = Vec::with_capacity(capacity);
        let mut attention_mask = Vec::with_capacity(capacity);
        let mut token_type_ids = Vec::with_capacity(capacity);

        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let padding = max_len - ids.len();

            input_ids.extend(ids.iter().map(|&id| id as i64));
            attention_mask.extend(mask.iter().map(|&m| m as i64));
            token_type_ids.extend(std::iter::repeat(0i64).take(ids.len()));

            input_ids.extend(std::iter::repeat(0i64).take(padding));
            attention_mask.extend(std::iter::repeat(0i64).take(padding));
            token_type_ids.extend(std::iter::repeat(0i64).take(padding));
        }

        Ok(BatchInputs {
            rows: texts.len(),
            max_len,
            input_ids,
            attention_mask,
            token_type_ids,
        })
    }

    /// Runs one forward pass over a chunk and pools each row
    fn run_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let inputs = self.tokenize(texts)?;
        let shape = (inputs.rows, inputs.max_len);

        let input_ids_array = Array2::from_shape_vec(shape, inputs.input_ids)
            .context("Failed to create input_ids array")?;
        let attention_mask_array = Array2::from_shape_vec(shape, inputs.attention_mask.clone())
            .context("Failed to create attention_mask array")?;
        let token_type_ids_array = Array2::from_shape_vec(shape, inputs.token_type_ids)
            .context("Failed to create token_type_ids array")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?,
            "token_type_ids" => Value::from_array(token_type_ids_array)?
        ])?;

        // Index [0] rather than by name: exports differ in output naming
        let hidden = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        let hidden = hidden
            .into_dimensionality::<Ix3>()
            .context("Model output is not [batch, seq_len, hidden_dim]")?;

        pool_hidden_states(hidden, &inputs.attention_mask, self.pooling)
    }
}

impl EmbeddingEncoder for OnnxEmbeddingModel {
    fn encode(
        &self,
        texts: &[String],
        normalize: bool,
        batch_size: Option<usize>,
    ) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for chunk in chunk_texts(texts, batch_size)? {
            debug!("Encoding chunk of {} texts", chunk.len());
            let mut pooled = self.run_chunk(chunk)?;
            if normalize {
                pooled.iter_mut().for_each(|v| l2_normalize(v));
            }
            embeddings.append(&mut pooled);
        }

        for (i, emb) in embeddings.iter().enumerate() {
            if emb.len() != self.dimension {
                anyhow::bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    emb.len(),
                    self.dimension
                );
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Creates the session on CUDA, falling back to CPU when CUDA is unavailable
fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    info!("   Attempting CUDA execution provider...");
    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!("✅ CUDA execution provider initialized");
            Ok(session)
        }
        Err(e) => {
            warn!("⚠️  CUDA execution provider failed: {}", e);
            warn!("   Falling back to CPU execution provider");
            Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(intra_threads)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .with_context(|| {
                    format!("Failed to load ONNX model from {}", model_path.display())
                })
        }
    }
}
