// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use fabstir_embedding_service::{
    api::{start_server, AppState},
    config::ServiceConfig,
    embeddings::load_encoder,
    version,
};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::parse();
    config.validate()?;

    info!("🚀 Starting {}", version::get_version_string());
    info!("📦 BUILD VERSION: {}", version::VERSION);

    // Model load failure is fatal: nothing binds without an encoder
    info!("🧠 Loading embedding model {}...", config.model_repo);
    let encoder = load_encoder(&config).await?;
    info!(
        "✅ Embedding model ready: {} ({}D)",
        encoder.model_name(),
        encoder.dimension()
    );

    let state = AppState::new(encoder, config.model_name.clone());
    start_server(&config, state).await
}
