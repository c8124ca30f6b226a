// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pooling and normalization helpers
//!
//! Transformer encoders emit token-level hidden states shaped
//! `[batch, seq_len, hidden_dim]`. These helpers reduce each row to a single
//! sentence vector and optionally scale it to unit length.

use anyhow::{anyhow, Result};
use ndarray::{ArrayView2, ArrayView3, Axis};
use std::fmt;
use std::str::FromStr;

/// How token embeddings are reduced to one sentence embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolingStrategy {
    /// Hidden state of the first (`[CLS]`) token. BGE models are trained for this.
    #[default]
    Cls,
    /// Attention-masked mean over all tokens.
    Mean,
}

impl FromStr for PoolingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cls" => Ok(Self::Cls),
            "mean" => Ok(Self::Mean),
            other => Err(format!(
                "unknown pooling strategy '{}' (expected 'cls' or 'mean')",
                other
            )),
        }
    }
}

impl fmt::Display for PoolingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cls => write!(f, "cls"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

/// Pools a `[batch, seq_len, hidden_dim]` tensor into one vector per row
///
/// `attention_mask` is the flattened `[batch, seq_len]` mask used to build the
/// model inputs (1 for real tokens, 0 for padding).
pub fn pool_hidden_states(
    hidden: ArrayView3<f32>,
    attention_mask: &[i64],
    strategy: PoolingStrategy,
) -> Result<Vec<Vec<f32>>> {
    let (batch, seq_len, _) = hidden.dim();
    if attention_mask.len() != batch * seq_len {
        return Err(anyhow!(
            "attention mask length {} does not match hidden states [{}, {}]",
            attention_mask.len(),
            batch,
            seq_len
        ));
    }

    hidden
        .axis_iter(Axis(0))
        .enumerate()
        .map(|(row, item)| {
            let mask = &attention_mask[row * seq_len..(row + 1) * seq_len];
            match strategy {
                PoolingStrategy::Cls => cls_pool(item),
                PoolingStrategy::Mean => mean_pool(item, mask),
            }
        })
        .collect()
}

/// Returns the hidden state of the first token
pub fn cls_pool(item: ArrayView2<f32>) -> Result<Vec<f32>> {
    if item.nrows() == 0 {
        return Err(anyhow!("cannot pool an empty token sequence"));
    }
    Ok(item.row(0).to_vec())
}

/// Averages token hidden states weighted by the attention mask
pub fn mean_pool(item: ArrayView2<f32>, mask: &[i64]) -> Result<Vec<f32>> {
    let (seq_len, hidden_dim) = item.dim();
    if mask.len() != seq_len {
        return Err(anyhow!(
            "mask length {} does not match sequence length {}",
            mask.len(),
            seq_len
        ));
    }

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut sum_mask = 0.0f32;

    for (token, &m) in item.axis_iter(Axis(0)).zip(mask.iter()) {
        let weight = m as f32;
        sum_mask += weight;
        for (acc, &value) in pooled.iter_mut().zip(token.iter()) {
            *acc += value * weight;
        }
    }

    let denom = sum_mask.max(1e-9);
    for value in &mut pooled {
        *value /= denom;
    }

    Ok(pooled)
}

/// Scales a vector to unit Euclidean norm in place; zero vectors are left as is
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
