//! Deterministic in-process fakes for the embedding model and the vector store.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::llm_client::InferenceProvider;
use crate::models::{JobRecord, TenantId};
use crate::resume::LatexCompiler;
use crate::retrieval::TenantRetrieval;
use crate::state::AppState;
use crate::vector::{EmbeddingProvider, VectorMatch, VectorRecord, VectorResult, VectorStore};

pub const TEST_API_KEY: &str = "test-api-key";

/// Bag-of-words feature hashing, L2-normalised. Texts sharing words score close.
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dimension: 64 }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % self.dimension] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

/// Cosine-similarity store keyed by id. The tenant filter is applied inside
/// `query`, like the real store's metadata filter.
#[derive(Default)]
pub struct InMemoryVectorStore {
    records: Mutex<HashMap<String, VectorRecord>>,
}

impl InMemoryVectorStore {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, record: VectorRecord) -> VectorResult<()> {
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        tenant: &TenantId,
    ) -> VectorResult<Vec<VectorMatch>> {
        let records = self.records.lock().unwrap();
        let mut matches: Vec<VectorMatch> = records
            .values()
            .filter(|r| &r.tenant_id == tenant)
            .map(|r| VectorMatch {
                id: r.id.clone(),
                score: cosine(&vector, &r.values),
                job_id: Some(r.id.clone()),
                text: Some(r.text.clone()),
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }
}

pub fn job(job_id: &str, tenant: &str, description: &str) -> JobRecord {
    JobRecord {
        job_id: job_id.to_string(),
        tenant_id: TenantId::parse(tenant).unwrap(),
        description: description.to_string(),
    }
}

pub fn retrieval_with_store() -> (TenantRetrieval, Arc<InMemoryVectorStore>) {
    let store = Arc::new(InMemoryVectorStore::default());
    let retrieval = TenantRetrieval::new(
        Arc::new(HashEmbedder::default()),
        Arc::clone(&store) as Arc<dyn VectorStore>,
    );
    (retrieval, store)
}

pub fn test_config() -> Config {
    Config::from_vars(|key| match key {
        "AI_SERVICE_API_KEY" => Some(TEST_API_KEY.to_string()),
        "PINECONE_API_KEY" => Some("pc-test".to_string()),
        "GEMINI_API_KEY" => Some("gm-test".to_string()),
        _ => None,
    })
    .unwrap()
}

/// State over in-memory retrieval, the given inference provider and compiler.
pub fn test_state(llm: Arc<dyn InferenceProvider>, compiler: LatexCompiler) -> AppState {
    let (retrieval, _store) = retrieval_with_store();
    AppState {
        retrieval,
        llm,
        compiler,
        config: test_config(),
    }
}
