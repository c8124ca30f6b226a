// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed/batch tests

use super::common::*;
use axum::http::StatusCode;

#[tokio::test]
async fn test_batch_returns_same_shape_as_embed() {
    let (status, json) = send(
        test_app(),
        post_json("/embed/batch", r#"{"texts": ["a", "b"]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["dimensions"], 1024);
    assert_eq!(embeddings_of(&json).len(), 2);
}

#[tokio::test]
async fn test_batch_size_does_not_change_vectors() {
    let app = test_app();
    let (_, small) = send(
        app.clone(),
        post_json("/embed/batch", r#"{"texts": ["a", "b"], "batch_size": 1}"#),
    )
    .await;
    let (_, large) = send(
        app,
        post_json("/embed/batch", r#"{"texts": ["a", "b"], "batch_size": 32}"#),
    )
    .await;

    assert_eq!(embeddings_of(&small), embeddings_of(&large));
}

#[tokio::test]
async fn test_batch_always_normalizes() {
    let (status, json) = send(
        test_app(),
        post_json("/embed/batch", r#"{"texts": ["a"], "normalize": false}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!((norm(&embeddings_of(&json)[0]) - 1.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_batch_matches_embed_vectors() {
    let app = test_app();
    let (_, single) = send(app.clone(), post_json("/embed", r#"{"text": ["p", "q"]}"#)).await;
    let (_, batch) = send(app, post_json("/embed/batch", r#"{"texts": ["p", "q"]}"#)).await;

    assert_eq!(embeddings_of(&single), embeddings_of(&batch));
}

#[tokio::test]
async fn test_batch_larger_than_batch_size() {
    let texts: Vec<String> = (0..10).map(|i| format!("t{}", i)).collect();
    let body = serde_json::json!({ "texts": texts, "batch_size": 3 }).to_string();

    let (status, json) = send(test_app(), post_json("/embed/batch", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 10);
}
