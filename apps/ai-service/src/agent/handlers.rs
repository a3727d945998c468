//! Axum route handler for the career-advice agent.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::{AgentRequest, RecommendationPipeline};
use crate::errors::AppError;
use crate::models::TenantId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InvokeAgentRequest {
    #[serde(alias = "user_id")]
    pub tenant_id: String,
    pub resume_text: String,
    pub job_description: String,
    pub user_goal: String,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub recommendation: String,
}

/// POST /agent/invoke
///
/// Runs analyze → retrieve → recommend and returns the recommendation text.
pub async fn handle_invoke_agent(
    State(state): State<AppState>,
    Json(request): Json<InvokeAgentRequest>,
) -> Result<Json<AgentResponse>, AppError> {
    let tenant_id = TenantId::parse(&request.tenant_id)?;
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resume_text cannot be empty".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let pipeline = RecommendationPipeline::new(state.llm.clone(), state.retrieval.clone());
    let outcome = pipeline
        .run(&AgentRequest {
            tenant_id,
            resume_text: request.resume_text,
            job_description: request.job_description,
            user_goal: request.user_goal,
        })
        .await?;

    info!(
        "Recommendation ready ({} skills, {} context jobs)",
        outcome.analysis.skills.len(),
        outcome.similar_jobs.len()
    );

    Ok(Json(AgentResponse {
        recommendation: outcome.recommendation,
    }))
}
