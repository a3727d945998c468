use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Opaque tenant identifier. Partitions every stored vector and every search.
///
/// Construct with `TenantId::parse`; an empty or whitespace-only id is rejected.
/// Otherwise the id is kept exactly as received, so `" u1 "` and `"u1"` are
/// different tenants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::Validation("tenant_id cannot be empty".to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job description stored in the vector index. Immutable once written;
/// re-embedding the same `job_id` overwrites the previous vector.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: String,
    pub tenant_id: TenantId,
    pub description: String,
}

/// One nearest-neighbour hit. `score` is cosine similarity: higher is closer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub id: String,
    pub description: String,
    pub score: f32,
}
