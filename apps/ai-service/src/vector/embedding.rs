//! Embedding generation.
//!
//! The production provider runs `all-MiniLM-L6-v2` locally through fastembed.
//! Inference is CPU-bound, so every call hops onto the blocking pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use crate::vector::{VectorError, VectorResult};

/// Output width of all-MiniLM-L6-v2.
pub const MINILM_DIMENSION: usize = 384;

/// Maps text to a fixed-width vector.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Width of every vector this provider returns.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>>;
}

/// Local sentence-transformer embeddings via fastembed.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    dimension: usize,
}

impl FastEmbedProvider {
    /// Loads the model, downloading it into `cache_dir` on first use.
    ///
    /// Blocking: call from `spawn_blocking` when inside the runtime.
    pub fn new(cache_dir: Option<PathBuf>) -> VectorResult<Self> {
        let mut options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }

        let model = TextEmbedding::try_new(options).map_err(|e| {
            VectorError::Embedding(format!(
                "Failed to initialize embedding model: {e}. \
                 The first start needs network access to download the model"
            ))
        })?;

        info!("Embedding model loaded: all-MiniLM-L6-v2 ({MINILM_DIMENSION} dims)");

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            dimension: MINILM_DIMENSION,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        let model = Arc::clone(&self.model);
        let input = text.to_string();

        let embeddings = tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|_| {
                VectorError::Embedding("Embedding model lock poisoned".to_string())
            })?;
            model
                .embed(vec![input], None)
                .map_err(|e| VectorError::Embedding(format!("Failed to generate embedding: {e}")))
        })
        .await
        .map_err(|e| VectorError::Embedding(format!("spawn_blocking failed in embedding: {e}")))??;

        let embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::Embedding("No embedding returned".to_string()))?;

        if embedding.len() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }
}
