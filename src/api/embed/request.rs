// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Request bodies for POST /embed and POST /embed/batch
//!
//! Both decode leniently (missing fields become `None`) so that validation
//! can report the endpoint's own error message instead of a serde one.

use crate::api::ApiError;
use crate::embeddings::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};

/// `text` accepts either one string or a list of strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    One(String),
    Many(Vec<String>),
}

impl TextInput {
    pub fn is_empty(&self) -> bool {
        match self {
            TextInput::One(text) => text.is_empty(),
            TextInput::Many(texts) => texts.is_empty(),
        }
    }

    pub fn into_texts(self) -> Vec<String> {
        match self {
            TextInput::One(text) => vec![text],
            TextInput::Many(texts) => texts,
        }
    }
}

/// Request body for POST /embed
///
/// # Example
/// ```json
/// { "text": ["Hello world", "Another text"], "normalize": true }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub text: Option<TextInput>,

    /// Default: true
    #[serde(default = "default_normalize")]
    pub normalize: bool,
}

fn default_normalize() -> bool {
    true
}

impl EmbedRequest {
    /// Validates the request and flattens `text` into an ordered list
    ///
    /// An absent, null, empty-string or empty-list `text` is rejected.
    pub fn into_texts(self) -> Result<Vec<String>, ApiError> {
        match self.text {
            Some(text) if !text.is_empty() => Ok(text.into_texts()),
            _ => Err(ApiError::ValidationError("Missing 'text' field".to_string())),
        }
    }
}

/// Request body for POST /embed/batch
///
/// # Example
/// ```json
/// { "texts": ["text1", "text2"], "batch_size": 32 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedBatchRequest {
    #[serde(default)]
    pub texts: Option<Vec<String>>,

    /// Chunking hint for the encoder. Default: 32
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Accepted for compatibility; batch embeddings are always normalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalize: Option<bool>,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl EmbedBatchRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        match &self.texts {
            Some(texts) if !texts.is_empty() => {}
            _ => {
                return Err(ApiError::ValidationError(
                    "Missing or invalid 'texts' field".to_string(),
                ))
            }
        }

        if self.batch_size == 0 {
            return Err(ApiError::ValidationError(
                "'batch_size' must be a positive integer".to_string(),
            ));
        }

        Ok(())
    }
}
