// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file resolution
//!
//! An ONNX embedding model needs two files: the exported graph
//! (`model.onnx`) and the HuggingFace tokenizer (`tokenizer.json`). They
//! either already sit on local disk or are fetched from the HuggingFace Hub
//! into the standard hub cache (`HF_HOME`).

use anyhow::{Context, Result};
use hf_hub::api::tokio::ApiBuilder;
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use tracing::info;

/// Path of the ONNX export inside a sentence-transformers hub repository
pub const HUB_MODEL_FILE: &str = "onnx/model.onnx";

/// Tokenizer file inside a hub repository
pub const HUB_TOKENIZER_FILE: &str = "tokenizer.json";

/// Where the model files come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Local {
        model_path: PathBuf,
        tokenizer_path: PathBuf,
    },
    HuggingFace {
        repo_id: String,
        revision: String,
    },
}

/// Local paths of a resolved model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

impl ModelSource {
    /// Resolves the source to files on local disk, downloading when needed
    pub async fn resolve(&self) -> Result<ModelFiles> {
        match self {
            ModelSource::Local {
                model_path,
                tokenizer_path,
            } => {
                if !model_path.exists() {
                    anyhow::bail!("ONNX model file not found: {}", model_path.display());
                }
                if !tokenizer_path.exists() {
                    anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
                }
                Ok(ModelFiles {
                    model_path: model_path.clone(),
                    tokenizer_path: tokenizer_path.clone(),
                })
            }
            ModelSource::HuggingFace { repo_id, revision } => {
                info!("Resolving {}@{} from the HuggingFace Hub", repo_id, revision);

                let api = ApiBuilder::new()
                    .with_progress(false)
                    .build()
                    .context("Failed to create HuggingFace Hub client")?;
                let repo = api.repo(Repo::with_revision(
                    repo_id.clone(),
                    RepoType::Model,
                    revision.clone(),
                ));

                let tokenizer_path = repo
                    .get(HUB_TOKENIZER_FILE)
                    .await
                    .with_context(|| format!("Failed to fetch {} from {}", HUB_TOKENIZER_FILE, repo_id))?;
                let model_path = repo
                    .get(HUB_MODEL_FILE)
                    .await
                    .with_context(|| format!("Failed to fetch {} from {}", HUB_MODEL_FILE, repo_id))?;

                info!("   model: {}", model_path.display());
                info!("   tokenizer: {}", tokenizer_path.display());

                Ok(ModelFiles {
                    model_path,
                    tokenizer_path,
                })
            }
        }
    }
}
