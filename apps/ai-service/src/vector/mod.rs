//! Vector layer: embedding generation, the vector store client and index provisioning.
//!
//! ```text
//! ┌──────────────────┐
//! │ TenantRetrieval  │  ← always passes a TenantId into every query
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐     ┌───────────────────┐
//! │   VectorStore    │     │ EmbeddingProvider │
//! │     (trait)      │     │      (trait)      │
//! └────────┬─────────┘     └────────┬──────────┘
//!          │                        │
//! ┌────────▼─────────┐     ┌────────▼──────────┐
//! │  PineconeIndex   │     │ FastEmbedProvider │
//! └──────────────────┘     └───────────────────┘
//! ```

use async_trait::async_trait;

use crate::models::TenantId;

pub mod embedding;
pub mod error;
pub mod pinecone;
pub mod provision;

pub use embedding::{EmbeddingProvider, FastEmbedProvider};
pub use error::{VectorError, VectorResult};
pub use pinecone::{PineconeAdmin, PineconeConfig, PineconeIndex};

/// Metadata key holding the tenant. Kept as `user_id` so records written by
/// earlier deployments of the service stay searchable.
pub const TENANT_METADATA_KEY: &str = "user_id";
/// Metadata key holding the embedded text.
pub const TEXT_METADATA_KEY: &str = "text";
pub const JOB_ID_METADATA_KEY: &str = "job_id";

/// A vector plus the metadata every record must carry.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub tenant_id: TenantId,
    pub text: String,
}

/// A raw hit from the store, before tenant-level post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub id: String,
    /// Cosine similarity; higher is closer.
    pub score: f32,
    pub job_id: Option<String>,
    pub text: Option<String>,
}

/// Thin client over the external vector database.
///
/// `query` takes the tenant as a required argument: implementations must send it
/// as a metadata filter inside the store query, never filter afterwards.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Writes the record keyed by `record.id`, replacing any previous vector with that id.
    async fn upsert(&self, record: VectorRecord) -> VectorResult<()>;

    /// Returns up to `top_k` nearest neighbours restricted to `tenant`.
    async fn query(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        tenant: &TenantId,
    ) -> VectorResult<Vec<VectorMatch>>;
}
