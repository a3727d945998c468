pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::agent::handlers as agent;
use crate::auth::require_api_key;
use crate::resume::handlers as resume;
use crate::retrieval::handlers as retrieval;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        // Job matching
        .route("/embed-job", post(retrieval::handle_embed_job))
        .route("/find-similar-jobs", post(retrieval::handle_find_similar))
        // Career agent
        .route("/agent/invoke", post(agent::handle_invoke_agent))
        // Resume tailoring
        .route("/rebuild-resume-latex", post(resume::handle_rebuild_latex))
        .route("/compile-latex-to-pdf", post(resume::handle_compile_latex))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(protected)
        .with_state(state)
}
