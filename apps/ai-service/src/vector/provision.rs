//! Index provisioning: makes sure the vector index exists before the service starts.
//!
//! Never recreates an index that already exists; an existing index with the wrong
//! width is reported instead of being touched.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::vector::{EmbeddingProvider, VectorError, VectorResult};

pub const DEFAULT_METRIC: &str = "cosine";
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const MAX_READY_WAIT: Duration = Duration::from_secs(120);
/// Text embedded to measure the model's real output width.
pub const DIMENSION_SAMPLE: &str = "get model dimension";

/// Desired index shape.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: String,
    pub cloud: String,
    pub region: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: usize,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

/// Control-plane operations needed for provisioning.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexAdmin: Send + Sync {
    async fn list_indexes(&self) -> VectorResult<Vec<IndexDescription>>;

    async fn create_index(&self, spec: &IndexSpec) -> VectorResult<()>;

    async fn describe_index(&self, name: &str) -> VectorResult<IndexDescription>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    AlreadyExists,
    Created,
}

/// Embeds a sample string and returns its width, which must match the
/// provider's declared `dimension()`.
pub async fn measure_dimension(embedder: &dyn EmbeddingProvider) -> VectorResult<usize> {
    let actual = embedder.embed(DIMENSION_SAMPLE).await?.len();
    let declared = embedder.dimension();
    if actual != declared {
        return Err(VectorError::DimensionMismatch {
            expected: declared,
            actual,
        });
    }
    Ok(actual)
}

/// Creates the index described by `spec` unless one with that name exists,
/// then waits until it reports ready.
pub async fn ensure_index(
    admin: &dyn IndexAdmin,
    spec: &IndexSpec,
    poll_interval: Duration,
    max_wait: Duration,
) -> VectorResult<ProvisionOutcome> {
    let existing = admin.list_indexes().await?;

    if let Some(index) = existing.iter().find(|i| i.name == spec.name) {
        if index.dimension != spec.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: spec.dimension,
                actual: index.dimension,
            });
        }
        if !index.metric.is_empty() && index.metric != spec.metric {
            warn!(
                "Index '{}' uses metric '{}', expected '{}'; scores may not be cosine similarity",
                spec.name, index.metric, spec.metric
            );
        }
        info!("Index '{}' already exists. No action needed.", spec.name);
        return Ok(ProvisionOutcome::AlreadyExists);
    }

    info!(
        "Creating serverless index '{}' (dimension={}, metric={}, {}/{})",
        spec.name, spec.dimension, spec.metric, spec.cloud, spec.region
    );
    admin.create_index(spec).await?;

    let started = Instant::now();
    loop {
        let description = admin.describe_index(&spec.name).await?;
        if description.status.ready {
            info!("Index '{}' created and ready", spec.name);
            return Ok(ProvisionOutcome::Created);
        }

        if started.elapsed() >= max_wait {
            return Err(VectorError::IndexNotReady {
                name: spec.name.clone(),
                waited_secs: max_wait.as_secs(),
            });
        }

        info!(
            "Waiting for index '{}' (state: {})...",
            spec.name, description.status.state
        );
        tokio::time::sleep(poll_interval).await;
    }
}
