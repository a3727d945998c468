use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::InferenceProvider;
use crate::resume::LatexCompiler;
use crate::retrieval::TenantRetrieval;

/// Shared application state injected into all route handlers via Axum extractors.
/// Clients are built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    /// Embedding model + vector store, always tenant-scoped.
    pub retrieval: TenantRetrieval,
    pub llm: Arc<dyn InferenceProvider>,
    pub compiler: LatexCompiler,
    pub config: Config,
}
