// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared helpers for the HTTP endpoint tests

use anyhow::{anyhow, Result};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fabstir_embedding_service::api::{create_app, AppState};
use fabstir_embedding_service::embeddings::{DeterministicEncoder, EmbeddingEncoder};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub const DIMENSIONS: usize = 1024;
pub const MODEL_NAME: &str = "BGE-large-en-v1.5";

/// Encoder double whose every call fails like a runtime error would
pub struct FailingEncoder;

impl EmbeddingEncoder for FailingEncoder {
    fn encode(&self, _: &[String], _: bool, _: Option<usize>) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("ONNX Runtime error: out of memory"))
    }

    fn dimension(&self) -> usize {
        DIMENSIONS
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Encoder double that drops the last vector
pub struct ShortEncoder(pub DeterministicEncoder);

impl EmbeddingEncoder for ShortEncoder {
    fn encode(&self, texts: &[String], normalize: bool, batch_size: Option<usize>) -> Result<Vec<Vec<f32>>> {
        let mut out = self.0.encode(texts, normalize, batch_size)?;
        out.pop();
        Ok(out)
    }

    fn dimension(&self) -> usize {
        self.0.dimension()
    }

    fn model_name(&self) -> &str {
        self.0.model_name()
    }
}

pub fn test_app() -> Router {
    let encoder = DeterministicEncoder::new("BAAI/bge-large-en-v1.5", DIMENSIONS).unwrap();
    app_with(Arc::new(encoder))
}

pub fn app_with(encoder: Arc<dyn EmbeddingEncoder>) -> Router {
    create_app(AppState::new(encoder, MODEL_NAME))
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends one request and decodes the JSON response body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub fn embeddings_of(json: &serde_json::Value) -> Vec<Vec<f32>> {
    serde_json::from_value(json["embeddings"].clone()).unwrap()
}

pub fn norm(vector: &[f32]) -> f32 {
    vector.iter().map(|x| x * x).sum::<f32>().sqrt()
}
