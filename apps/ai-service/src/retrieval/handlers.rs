//! Axum route handlers for job embedding and tenant-scoped job matching.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{JobRecord, SimilarityResult, TenantId};
use crate::state::AppState;

/// Body shared by `/embed-job` and `/find-similar-jobs`.
#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub job_id: String,
    #[serde(alias = "user_id")]
    pub tenant_id: String,
    pub job_description: String,
}

impl JobRequest {
    fn validate(self) -> Result<JobRecord, AppError> {
        let tenant_id = TenantId::parse(&self.tenant_id)?;
        if self.job_id.trim().is_empty() {
            return Err(AppError::Validation("job_id cannot be empty".to_string()));
        }
        if self.job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "job_description cannot be empty".to_string(),
            ));
        }
        Ok(JobRecord {
            job_id: self.job_id,
            tenant_id,
            description: self.job_description,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct EmbedJobResponse {
    pub message: String,
    pub job_id: String,
}

/// POST /embed-job
///
/// Embeds the description and stores it under `job_id` for the tenant.
pub async fn handle_embed_job(
    State(state): State<AppState>,
    Json(request): Json<JobRequest>,
) -> Result<Json<EmbedJobResponse>, AppError> {
    let job = request.validate()?;

    state.retrieval.upsert(&job).await?;

    Ok(Json(EmbedJobResponse {
        message: "Job embedded successfully".to_string(),
        job_id: job.job_id,
    }))
}

/// POST /find-similar-jobs
///
/// Up to three of the tenant's other jobs, most similar first.
pub async fn handle_find_similar(
    State(state): State<AppState>,
    Json(request): Json<JobRequest>,
) -> Result<Json<Vec<SimilarityResult>>, AppError> {
    let job = request.validate()?;

    let results = state
        .retrieval
        .find_similar(&job.job_id, &job.tenant_id, &job.description)
        .await?;

    Ok(Json(results))
}
