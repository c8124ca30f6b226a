// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Hash-seeded embedding encoder
//!
//! Produces stable pseudo-random vectors without loading a model. Used by the
//! test suites and benches, and by `--backend deterministic` for offline smoke
//! runs of the HTTP surface.

use super::{chunk_texts, l2_normalize, EmbeddingEncoder};
use anyhow::{anyhow, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone)]
pub struct DeterministicEncoder {
    model_name: String,
    dimension: usize,
}

impl DeterministicEncoder {
    pub fn new(model_name: impl Into<String>, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(anyhow!("Embedding dimension must be greater than 0"));
        }

        Ok(Self {
            model_name: model_name.into(),
            dimension,
        })
    }

    fn generate(&self, text: &str, normalize: bool) -> Vec<f32> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut current_seed = hasher.finish();

        let mut embedding = Vec::with_capacity(self.dimension);
        for i in 0..self.dimension {
            // Linear congruential step, mixed with the position
            current_seed =
                (current_seed.wrapping_mul(1664525).wrapping_add(1013904223)) ^ (i as u64);
            let value = (current_seed as f64 / u64::MAX as f64) * 2.0 - 1.0;
            embedding.push(value as f32);
        }

        if normalize {
            l2_normalize(&mut embedding);
        }

        embedding
    }
}

impl EmbeddingEncoder for DeterministicEncoder {
    fn encode(
        &self,
        texts: &[String],
        normalize: bool,
        batch_size: Option<usize>,
    ) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in chunk_texts(texts, batch_size)? {
            embeddings.extend(chunk.iter().map(|text| self.generate(text, normalize)));
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
