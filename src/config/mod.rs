// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Every option can be given as a command line flag or an environment
//! variable (`EMBED_*`). `main` loads `.env` before parsing.

use crate::embeddings::{ModelSource, PoolingStrategy};
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

/// Which encoder implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// ONNX Runtime with a HuggingFace tokenizer
    Onnx,
    /// Hash-seeded vectors, no model files needed
    Deterministic,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("port must be greater than 0")]
    InvalidPort,
    #[error("{field} must be greater than 0")]
    ZeroValue { field: &'static str },
    #[error("--model-path and --tokenizer-path must be given together")]
    IncompleteLocalModel,
}

/// Fabstir Embedding Service
#[derive(Parser, Debug, Clone)]
#[command(name = "fabstir-embedding-service")]
#[command(version)]
#[command(about = "HTTP text-embedding service", long_about = None)]
pub struct ServiceConfig {
    /// Address to bind
    #[arg(long, env = "EMBED_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "EMBED_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Encoder backend
    #[arg(long, env = "EMBED_BACKEND", value_enum, default_value_t = Backend::Onnx)]
    pub backend: Backend,

    /// HuggingFace Hub repository holding onnx/model.onnx and tokenizer.json
    #[arg(long, env = "EMBED_MODEL_REPO", default_value = "BAAI/bge-large-en-v1.5")]
    pub model_repo: String,

    /// Hub revision (branch, tag or commit)
    #[arg(long, env = "EMBED_MODEL_REVISION", default_value = "main")]
    pub model_revision: String,

    /// Model name reported by /health
    #[arg(long, env = "EMBED_MODEL_NAME", default_value = "BGE-large-en-v1.5")]
    pub model_name: String,

    /// Local ONNX model file (skips the hub)
    #[arg(long, env = "EMBED_MODEL_PATH", requires = "tokenizer_path")]
    pub model_path: Option<PathBuf>,

    /// Local tokenizer.json (skips the hub)
    #[arg(long, env = "EMBED_TOKENIZER_PATH", requires = "model_path")]
    pub tokenizer_path: Option<PathBuf>,

    /// Embedding dimensions produced by the model
    #[arg(long, env = "EMBED_DIMENSIONS", default_value_t = 1024)]
    pub dimensions: usize,

    /// Tokenizer truncation length
    #[arg(long, env = "EMBED_MAX_LENGTH", default_value_t = 512)]
    pub max_length: usize,

    /// Pooling strategy (cls or mean)
    #[arg(long, env = "EMBED_POOLING", default_value_t = PoolingStrategy::Cls)]
    pub pooling: PoolingStrategy,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "EMBED_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8000,
            backend: Backend::Onnx,
            model_repo: "BAAI/bge-large-en-v1.5".to_string(),
            model_revision: "main".to_string(),
            model_name: "BGE-large-en-v1.5".to_string(),
            model_path: None,
            tokenizer_path: None,
            dimensions: 1024,
            max_length: 512,
            pooling: PoolingStrategy::Cls,
            intra_threads: 4,
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.dimensions == 0 {
            return Err(ConfigError::ZeroValue { field: "dimensions" });
        }
        if self.max_length == 0 {
            return Err(ConfigError::ZeroValue { field: "max_length" });
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::ZeroValue {
                field: "intra_threads",
            });
        }
        if self.model_path.is_some() != self.tokenizer_path.is_some() {
            return Err(ConfigError::IncompleteLocalModel);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Local files when both paths are set, otherwise the hub repository
    pub fn model_source(&self) -> ModelSource {
        match (&self.model_path, &self.tokenizer_path) {
            (Some(model_path), Some(tokenizer_path)) => ModelSource::Local {
                model_path: model_path.clone(),
                tokenizer_path: tokenizer_path.clone(),
            },
            _ => ModelSource::HuggingFace {
                repo_id: self.model_repo.clone(),
                revision: self.model_revision.clone(),
            },
        }
    }
}
