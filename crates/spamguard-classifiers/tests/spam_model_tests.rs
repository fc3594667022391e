//! Spam model loading and inference tests
//!
//! Each test writes a tiny embedding-bag model (word-level tokenizer, two
//! dimensional embeddings) to a temp directory and loads it through the
//! public loader.

use candle_core::{Device, Tensor};
use spamguard_classifiers::model_loader::{CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE};
use spamguard_classifiers::{Classifier, DecisionPolicy, ModelConfig, SpamModel};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const SPAM_WORDS: &[&str] = &["congratulations", "won", "gift", "card", "claim", "free", "prize"];
const HAM_WORDS: &[&str] = &["meeting", "tomorrow", "lunch", "thanks", "see", "you", "at"];

fn vocab() -> Vec<&'static str> {
    let mut words = vec!["[UNK]"];
    words.extend_from_slice(SPAM_WORDS);
    words.extend_from_slice(HAM_WORDS);
    words
}

fn write_tokenizer(dir: &Path) {
    let vocab: serde_json::Map<String, serde_json::Value> = vocab()
        .into_iter()
        .enumerate()
        .map(|(i, w)| (w.to_string(), serde_json::json!(i)))
        .collect();

    let tokenizer = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });
    std::fs::write(dir.join(TOKENIZER_FILE), tokenizer.to_string()).unwrap();
}

fn write_config(dir: &Path, vocab_size: usize) {
    let config = serde_json::json!({
        "architecture": "embedding-bag",
        "vocab_size": vocab_size,
        "hidden_size": 2,
        "max_length": 64
    });
    std::fs::write(dir.join(CONFIG_FILE), config.to_string()).unwrap();
}

fn write_weights(dir: &Path, rows: usize) {
    let device = Device::Cpu;
    // spam words point along x, ham words along y, unknown tokens are zero
    let mut embedding = Vec::with_capacity(rows * 2);
    for word in vocab().into_iter().take(rows) {
        if SPAM_WORDS.contains(&word) {
            embedding.extend_from_slice(&[1f32, 0.]);
        } else if HAM_WORDS.contains(&word) {
            embedding.extend_from_slice(&[0f32, 1.]);
        } else {
            embedding.extend_from_slice(&[0f32, 0.]);
        }
    }

    let mut tensors = HashMap::new();
    tensors.insert(
        "embedding.weight".to_string(),
        Tensor::from_vec(embedding, (rows, 2), &device).unwrap(),
    );
    tensors.insert(
        "classifier.weight".to_string(),
        Tensor::new(&[[8f32, -8.]], &device).unwrap(),
    );
    tensors.insert(
        "classifier.bias".to_string(),
        Tensor::new(&[0f32], &device).unwrap(),
    );
    candle_core::safetensors::save(&tensors, dir.join(WEIGHTS_FILE)).unwrap();
}

fn model_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    let n = vocab().len();
    write_tokenizer(dir.path());
    write_config(dir.path(), n);
    write_weights(dir.path(), n);
    dir
}

fn load(dir: &TempDir) -> SpamModel {
    SpamModel::load(&ModelConfig::from_local(dir.path())).unwrap()
}

#[test]
fn test_spam_example_is_spam() {
    let dir = model_dir();
    let model = load(&dir);

    let verdict = model
        .predict("Congratulations! You've won a $500 gift card. Claim it here")
        .unwrap();

    assert!(verdict.is_spam);
    assert!(verdict.confidence > 0.5);
    assert!(verdict.confidence <= 1.0);
}

#[test]
fn test_ham_example_is_ham() {
    let dir = model_dir();
    let model = load(&dir);

    let verdict = model.predict("See you at lunch tomorrow, thanks").unwrap();
    assert!(!verdict.is_spam);
    assert!(verdict.confidence < 0.5);
    assert!(verdict.confidence >= 0.0);
}

#[test]
fn test_empty_text_is_well_formed() {
    let dir = model_dir();
    let model = load(&dir);

    let verdict = model.predict("").unwrap();
    assert!((verdict.confidence - 0.5).abs() < 1e-6);
    assert!(!verdict.is_spam);
}

#[test]
fn test_threshold_is_configurable() {
    let dir = model_dir();
    let config = ModelConfig::from_local(dir.path()).with_policy(DecisionPolicy {
        threshold: 0.999_999,
        ..Default::default()
    });
    let model = SpamModel::load(&config).unwrap();

    // scores above 0.5 but stays under a near-one threshold
    let verdict = model.predict("unknown words and free").unwrap();
    assert!(verdict.confidence > 0.5);
    assert!(!verdict.is_spam);
}

#[test]
fn test_missing_weights_is_model_load_error() {
    let dir = model_dir();
    std::fs::remove_file(dir.path().join(WEIGHTS_FILE)).unwrap();

    let err = SpamModel::load(&ModelConfig::from_local(dir.path())).unwrap_err();
    assert_eq!(err.kind(), "model_load");
}

#[test]
fn test_corrupted_weights_is_model_load_error() {
    let dir = model_dir();
    std::fs::write(dir.path().join(WEIGHTS_FILE), b"not a safetensors file").unwrap();

    let err = SpamModel::load(&ModelConfig::from_local(dir.path())).unwrap_err();
    assert_eq!(err.kind(), "model_load");
}

#[test]
fn test_shape_mismatch_is_model_load_error() {
    let dir = model_dir();
    // config claims more rows than the stored embedding table has
    write_config(dir.path(), vocab().len() + 10);

    let err = SpamModel::load(&ModelConfig::from_local(dir.path())).unwrap_err();
    assert_eq!(err.kind(), "model_load");
}

#[test]
fn test_tokenizer_larger_than_embedding_rejected() {
    let dir = model_dir();
    write_config(dir.path(), 3);
    write_weights(dir.path(), 3);

    let err = SpamModel::load(&ModelConfig::from_local(dir.path())).unwrap_err();
    assert!(err.to_string().contains("exceeds embedding rows"));
}

#[test]
fn test_unsupported_architecture_rejected() {
    let dir = model_dir();
    std::fs::write(
        dir.path().join(CONFIG_FILE),
        r#"{"architecture": "bert", "vocab_size": 15, "hidden_size": 2}"#,
    )
    .unwrap();

    let err = SpamModel::load(&ModelConfig::from_local(dir.path())).unwrap_err();
    assert_eq!(err.kind(), "model_load");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_classification_shares_one_model() {
    let dir = model_dir();
    let model: Arc<dyn Classifier> = Arc::new(load(&dir));

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let model = model.clone();
            tokio::spawn(async move {
                let text = if i % 2 == 0 { "free prize" } else { "lunch meeting" };
                (i, model.classify(text).await.unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (i, verdict) = handle.await.unwrap();
        assert_eq!(verdict.is_spam, i % 2 == 0);
    }
}
