// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type shared by POST /embed and POST /embed/batch

use crate::api::ApiError;
use serde::{Deserialize, Serialize};

/// Response body for the embedding endpoints
///
/// # Example
/// ```json
/// {
///   "embeddings": [[0.01, -0.02, ...]],
///   "dimensions": 1024,
///   "count": 1
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    /// One vector per input text, in input order
    pub embeddings: Vec<Vec<f32>>,

    /// Length of every vector
    pub dimensions: usize,

    /// Number of input texts
    pub count: usize,
}

impl EmbedResponse {
    /// Builds a response, checking it against the request it answers
    ///
    /// The encoder must return exactly `expected_count` vectors of
    /// `dimensions` entries each; anything else is an internal error rather
    /// than a partial result.
    pub fn new(
        embeddings: Vec<Vec<f32>>,
        dimensions: usize,
        expected_count: usize,
    ) -> Result<Self, ApiError> {
        if embeddings.len() != expected_count {
            return Err(ApiError::InternalError(format!(
                "encoder returned {} embeddings for {} inputs",
                embeddings.len(),
                expected_count
            )));
        }

        if let Some((index, embedding)) = embeddings
            .iter()
            .enumerate()
            .find(|(_, e)| e.len() != dimensions)
        {
            return Err(ApiError::InternalError(format!(
                "embedding {} has {} dimensions (expected {})",
                index,
                embedding.len(),
                dimensions
            )));
        }

        Ok(Self {
            count: embeddings.len(),
            embeddings,
            dimensions,
        })
    }
}
