// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX model tests
//!
//! These need the exported bge-large-en-v1.5 files on disk and are ignored by
//! default. Run with:
//!
//! ```text
//! EMBED_MODEL_PATH=... EMBED_TOKENIZER_PATH=... cargo test -- --ignored
//! ```

use fabstir_embedding_service::embeddings::{
    EmbeddingEncoder, OnnxEmbeddingModel, OnnxModelOptions, PoolingStrategy,
};
use std::env;

const MODEL_PATH: &str = "/workspace/models/bge-large-en-v1.5-onnx/model.onnx";
const TOKENIZER_PATH: &str = "/workspace/models/bge-large-en-v1.5-onnx/tokenizer.json";

fn load_model(options: OnnxModelOptions) -> OnnxEmbeddingModel {
    let model_path = env::var("EMBED_MODEL_PATH").unwrap_or_else(|_| MODEL_PATH.to_string());
    let tokenizer_path =
        env::var("EMBED_TOKENIZER_PATH").unwrap_or_else(|_| TOKENIZER_PATH.to_string());

    OnnxEmbeddingModel::load(model_path, tokenizer_path, options)
        .expect("Failed to load ONNX embedding model")
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    dot / (na * nb)
}

#[test]
#[ignore]
fn test_bge_large_dimensions_and_norm() {
    let model = load_model(OnnxModelOptions::default());
    assert_eq!(model.dimension(), 1024);

    let embeddings = model
        .encode(&texts(&["hello", "Rust is a systems language"]), true, None)
        .unwrap();

    assert_eq!(embeddings.len(), 2);
    for embedding in &embeddings {
        assert_eq!(embedding.len(), 1024);
        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3, "norm was {}", norm);
    }
}

#[test]
#[ignore]
fn test_batch_size_invariance_within_tolerance() {
    let model = load_model(OnnxModelOptions::default());
    let input = texts(&[
        "short",
        "a considerably longer sentence that forces padding on its neighbours",
        "medium length text",
    ]);

    let one = model.encode(&input, true, Some(1)).unwrap();
    let all = model.encode(&input, true, Some(32)).unwrap();

    for (a, b) in one.iter().zip(all.iter()) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-3);
        }
    }
}

#[test]
#[ignore]
fn test_semantic_similarity_ordering() {
    let model = load_model(OnnxModelOptions::default());
    let e = model
        .encode(
            &texts(&[
                "The cat sits on the mat",
                "A kitten is resting on a rug",
                "Quarterly revenue grew by twelve percent",
            ]),
            true,
            None,
        )
        .unwrap();

    assert!(cosine(&e[0], &e[1]) > cosine(&e[0], &e[2]));
}

#[test]
#[ignore]
fn test_mean_pooling_differs_from_cls() {
    let cls = load_model(OnnxModelOptions::default());
    let mean = load_model(OnnxModelOptions {
        pooling: PoolingStrategy::Mean,
        ..OnnxModelOptions::default()
    });

    let input = texts(&["pooling strategies"]);
    let a = cls.encode(&input, true, None).unwrap();
    let b = mean.encode(&input, true, None).unwrap();
    assert_ne!(a, b);
}

#[test]
#[ignore]
fn test_wrong_dimension_rejected_at_load() {
    let model_path = env::var("EMBED_MODEL_PATH").unwrap_or_else(|_| MODEL_PATH.to_string());
    let tokenizer_path =
        env::var("EMBED_TOKENIZER_PATH").unwrap_or_else(|_| TOKENIZER_PATH.to_string());

    let result = OnnxEmbeddingModel::load(
        model_path,
        tokenizer_path,
        OnnxModelOptions {
            dimension: 384,
            ..OnnxModelOptions::default()
        },
    );
    assert!(result.is_err());
}

#[test]
fn test_missing_model_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = OnnxEmbeddingModel::load(
        dir.path().join("model.onnx"),
        dir.path().join("tokenizer.json"),
        OnnxModelOptions::default(),
    );

    let err = result.unwrap_err().to_string();
    assert!(err.contains("ONNX model file not found"), "{}", err);
}
