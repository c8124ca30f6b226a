// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! POST /embed (one or many texts, optional normalization) and
//! POST /embed/batch (many texts, chunked, always normalized).

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{embed_batch_handler, embed_handler};
pub use request::{EmbedBatchRequest, EmbedRequest, TextInput};
pub use response::EmbedResponse;
