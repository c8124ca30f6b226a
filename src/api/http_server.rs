// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{embed_batch_handler, embed_handler, health_handler, ApiError};
use crate::config::ServiceConfig;
use crate::embeddings::EmbeddingEncoder;

/// Shared handler state: the encoder loaded at startup
#[derive(Clone)]
pub struct AppState {
    encoder: Arc<dyn EmbeddingEncoder>,
    model_name: String,
}

impl AppState {
    /// `model_name` is the display name reported by /health
    pub fn new(encoder: Arc<dyn EmbeddingEncoder>, model_name: impl Into<String>) -> Self {
        Self {
            encoder,
            model_name: model_name.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dimensions(&self) -> usize {
        self.encoder.dimension()
    }

    /// Runs the blocking encoder on Tokio's blocking pool
    pub async fn encode(
        &self,
        texts: Vec<String>,
        normalize: bool,
        batch_size: Option<usize>,
    ) -> Result<Vec<Vec<f32>>, ApiError> {
        let encoder = self.encoder.clone();
        let embeddings =
            tokio::task::spawn_blocking(move || encoder.encode(&texts, normalize, batch_size))
                .await
                .map_err(|e| ApiError::InternalError(format!("embedding task failed: {}", e)))??;
        Ok(embeddings)
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/embed", post(embed_handler))
        .route("/embed/batch", post(embed_batch_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(config: &ServiceConfig, state: AppState) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
