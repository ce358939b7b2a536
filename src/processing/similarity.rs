//! Semantic similarity between skill names
//!
//! `EmbeddingOracle` wraps a Model2Vec static embedding model that is loaded
//! lazily, at most once per process, and reused for every comparison.
//! `LexicalOracle` is an offline stand-in built on edit distance.

use crate::error::{Result, SkillGapError};
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;
use strsim::{jaro_winkler, normalized_levenshtein};

/// Anything that can score how interchangeable two skill names are
pub trait SimilarityOracle: Send + Sync {
    /// Symmetric score in [0, 1]; 1.0 means the same skill
    fn similarity(&self, a: &str, b: &str) -> Result<f32>;

    fn name(&self) -> &str;
}

/// Lowercase both skills and test the score strictly above `threshold`
pub fn is_match(oracle: &dyn SimilarityOracle, a: &str, b: &str, threshold: f32) -> Result<bool> {
    let score = oracle.similarity(&a.to_lowercase(), &b.to_lowercase())?;
    Ok(score > threshold)
}

/// Cosine similarity between two embeddings, in [-1, 1]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(SkillGapError::ModelUnavailable(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok(dot_product / (norm_a * norm_b))
    }
}

/// Map cosine similarity onto [0, 1], absorbing floating-point overshoot
pub fn remap_cosine(cosine: f32) -> f32 {
    ((cosine + 1.0) / 2.0).clamp(0.0, 1.0)
}

static SHARED_ORACLE: OnceCell<EmbeddingOracle> = OnceCell::new();

/// Similarity backed by a sentence-embedding model
pub struct EmbeddingOracle {
    source: String,
    // The outcome of the one load attempt, failures included
    model: OnceCell<std::result::Result<StaticModel, String>>,
    cache: Mutex<HashMap<String, Vec<f32>>>,
}

impl EmbeddingOracle {
    /// `source` is a Hugging Face repo id or a local model folder.
    /// Nothing is loaded until the first comparison.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            model: OnceCell::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide instance; the first caller's source wins
    pub fn shared(source: &str) -> &'static EmbeddingOracle {
        let oracle = SHARED_ORACLE.get_or_init(|| EmbeddingOracle::new(source));
        if oracle.source != source {
            warn!(
                "Embedding model already bound to '{}', ignoring request for '{}'",
                oracle.source, source
            );
        }
        oracle
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.model.get(), Some(Ok(_)))
    }

    /// True once a load has been attempted and failed
    pub fn load_failed(&self) -> bool {
        matches!(self.model.get(), Some(Err(_)))
    }

    /// Load the model if needed. Concurrent callers block until the single
    /// initialisation finishes. A failed load is remembered and every later
    /// call reports the same error without touching the disk or network again.
    pub fn model(&self) -> Result<&StaticModel> {
        let loaded = self.model.get_or_init(|| {
            let start_time = Instant::now();
            info!("Loading embedding model from: {}", self.source);

            match StaticModel::from_pretrained(&self.source, None, None, None) {
                Ok(model) => {
                    info!("Embedding model loaded in {:.2?}", start_time.elapsed());
                    Ok(model)
                }
                Err(e) => {
                    warn!("Embedding model unavailable: {}", e);
                    Err(format!("Failed to load '{}': {}", self.source, e))
                }
            }
        });
        loaded
            .as_ref()
            .map_err(|message| SkillGapError::ModelUnavailable(message.clone()))
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cached(text) {
            return Ok(cached);
        }

        let embedding = self.model()?.encode_single(text);
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(text.to_string(), embedding.clone());
        }
        Ok(embedding)
    }

    fn cached(&self, text: &str) -> Option<Vec<f32>> {
        self.cache.lock().ok().and_then(|cache| cache.get(text).cloned())
    }

    pub fn cache_size(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl SimilarityOracle for EmbeddingOracle {
    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let embedding_a = self.embed(a)?;
        let embedding_b = self.embed(b)?;
        let cosine = cosine_similarity(&embedding_a, &embedding_b)?;
        Ok(remap_cosine(cosine))
    }

    fn name(&self) -> &str {
        &self.source
    }
}

/// Offline similarity: mean of normalised Levenshtein and Jaro-Winkler
#[derive(Debug, Clone, Default)]
pub struct LexicalOracle;

impl LexicalOracle {
    pub fn new() -> Self {
        Self
    }
}

impl SimilarityOracle for LexicalOracle {
    fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        if a == b {
            return Ok(1.0);
        }
        let score = (normalized_levenshtein(&a, &b) + jaro_winkler(&a, &b)) / 2.0;
        Ok((score as f32).clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        "lexical"
    }
}
