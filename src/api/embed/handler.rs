// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed and POST /embed/batch handlers

use crate::api::embed::{EmbedBatchRequest, EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{debug, error, warn};

/// POST /embed handler
///
/// # Request Body
/// ```json
/// { "text": "string" | ["array", "of", "strings"], "normalize": true }
/// ```
///
/// # Errors
/// - 400 when `text` is missing/empty or the body does not decode
/// - 500 when encoding fails
pub async fn embed_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmbedRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(request) = payload?;
    let normalize = request.normalize;
    let texts = request.into_texts()?;
    let count = texts.len();

    debug!("Embedding {} texts (normalize={})", count, normalize);

    let embeddings = state
        .encode(texts, normalize, None)
        .await
        .inspect_err(|e| error!("Embedding failed: {}", e))?;

    EmbedResponse::new(embeddings, state.dimensions(), count).map(Json)
}

/// POST /embed/batch handler
///
/// Embeddings are always normalized here; `batch_size` only sets how many
/// texts go through the model per forward pass.
///
/// # Request Body
/// ```json
/// { "texts": ["text1", "text2"], "batch_size": 32 }
/// ```
pub async fn embed_batch_handler(
    State(state): State<AppState>,
    payload: Result<Json<EmbedBatchRequest>, JsonRejection>,
) -> Result<Json<EmbedResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    if request.normalize == Some(false) {
        warn!("Ignoring normalize=false on /embed/batch; batch embeddings are always normalized");
    }

    let texts = request.texts.unwrap_or_default();
    let count = texts.len();

    debug!(
        "Batch embedding {} texts (batch_size={})",
        count, request.batch_size
    );

    let embeddings = state
        .encode(texts, true, Some(request.batch_size))
        .await
        .inspect_err(|e| error!("Batch embedding failed: {}", e))?;

    EmbedResponse::new(embeddings, state.dimensions(), count).map(Json)
}
