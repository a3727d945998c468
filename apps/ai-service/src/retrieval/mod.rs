//! Tenant-scoped retrieval, the only path from the service to the vector store.
//!
//! Every write attaches the tenant as metadata and every read passes the tenant
//! into the store query, so a search for tenant T can never see another tenant's jobs.

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{JobRecord, SimilarityResult, TenantId};
use crate::vector::{EmbeddingProvider, VectorRecord, VectorResult, VectorStore};

pub mod handlers;

/// Neighbours fetched for find-similar before the queried job is excluded.
pub const FIND_SIMILAR_FETCH_K: usize = 5;
/// Maximum results returned by find-similar.
pub const FIND_SIMILAR_MAX_RESULTS: usize = 3;

/// Parameters for a tenant-scoped similarity search.
pub struct SearchParams<'a> {
    pub query_text: &'a str,
    pub tenant: &'a TenantId,
    /// Neighbours requested from the store.
    pub k: usize,
    /// Result id to drop, typically the job the query was built from.
    pub exclude_id: Option<&'a str>,
    pub max_results: usize,
}

#[derive(Clone)]
pub struct TenantRetrieval {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl TenantRetrieval {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Embeds the job description and writes it keyed by `job_id`.
    /// Re-upserting an id replaces the earlier vector.
    pub async fn upsert(&self, job: &JobRecord) -> VectorResult<()> {
        let values = self.embedder.embed(&job.description).await?;

        self.store
            .upsert(VectorRecord {
                id: job.job_id.clone(),
                values,
                tenant_id: job.tenant_id.clone(),
                text: job.description.clone(),
            })
            .await?;

        info!("Embedded job {} for tenant {}", job.job_id, job.tenant_id);
        Ok(())
    }

    /// Returns tenant-scoped neighbours ordered by descending similarity.
    /// An empty result is valid.
    pub async fn search(&self, params: SearchParams<'_>) -> VectorResult<Vec<SimilarityResult>> {
        let SearchParams {
            query_text,
            tenant,
            k,
            exclude_id,
            max_results,
        } = params;

        let vector = self.embedder.embed(query_text).await?;
        let matches = self.store.query(vector, k, tenant).await?;

        let mut results: Vec<SimilarityResult> = matches
            .into_iter()
            .map(|m| {
                let id = m.job_id.unwrap_or(m.id);
                let description = m.text.unwrap_or_else(|| {
                    warn!("Vector {id} has no stored text");
                    String::new()
                });
                SimilarityResult {
                    id,
                    description,
                    score: m.score,
                }
            })
            .filter(|r| exclude_id != Some(r.id.as_str()))
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(max_results);
        Ok(results)
    }

    /// Up to three other jobs of the same tenant that resemble `description`.
    ///
    /// Over-fetches so the queried job, usually its own best match, can be
    /// dropped without starving the result set.
    pub async fn find_similar(
        &self,
        job_id: &str,
        tenant: &TenantId,
        description: &str,
    ) -> VectorResult<Vec<SimilarityResult>> {
        self.search(SearchParams {
            query_text: description,
            tenant,
            k: FIND_SIMILAR_FETCH_K,
            exclude_id: Some(job_id),
            max_results: FIND_SIMILAR_MAX_RESULTS,
        })
        .await
    }
}
