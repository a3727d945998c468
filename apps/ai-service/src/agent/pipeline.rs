//! Career-advice pipeline: analyze → retrieve → recommend.
//!
//! Strictly linear. Each stage returns an immutable value consumed by the next,
//! and the first failure aborts the run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::prompts::{
    ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_ROLE, RECOMMENDATION_PROMPT_TEMPLATE,
};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_only_system};
use crate::llm_client::{complete_json, InferenceProvider, LlmError};
use crate::models::TenantId;
use crate::retrieval::{SearchParams, TenantRetrieval};

/// Neighbours retrieved as context for the recommendation.
pub const CONTEXT_JOBS_K: usize = 3;
const EXPECTED_SKILLS: std::ops::RangeInclusive<usize> = 5..=7;
const SNIPPET_SEPARATOR: &str = "\n---\n";

#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub tenant_id: TenantId,
    pub resume_text: String,
    pub job_description: String,
    pub user_goal: String,
}

/// Stage 1 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub skills: Vec<String>,
    pub summary: String,
}

/// Everything one run produced, in stage order.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub analysis: ResumeAnalysis,
    pub similar_jobs: Vec<String>,
    pub recommendation: String,
}

/// Stage 1. Output that does not match the `ResumeAnalysis` schema is
/// `MalformedModelOutput`; a skill count outside 5–7 is only logged.
pub async fn analyze_resume(
    llm: &dyn InferenceProvider,
    resume_text: &str,
) -> Result<ResumeAnalysis, AppError> {
    let prompt = fill_template(ANALYSIS_PROMPT_TEMPLATE, &[("resume", resume_text)]);

    let system = json_only_system(ANALYSIS_ROLE);

    let analysis: ResumeAnalysis = complete_json(llm, &prompt, &system)
        .await
        .map_err(|e| match e {
            LlmError::Parse(e) => AppError::MalformedModelOutput(format!("resume analysis: {e}")),
            other => AppError::Llm(format!("Resume analysis failed: {other}")),
        })?;

    if !EXPECTED_SKILLS.contains(&analysis.skills.len()) {
        warn!(
            "Resume analysis returned {} skills (expected 5-7)",
            analysis.skills.len()
        );
    }
    Ok(analysis)
}

/// Stage 2. Tenant-scoped neighbours of the target job, no exclusion.
pub async fn find_similar_jobs(
    retrieval: &TenantRetrieval,
    tenant: &TenantId,
    job_description: &str,
) -> Result<Vec<String>, AppError> {
    let results = retrieval
        .search(SearchParams {
            query_text: job_description,
            tenant,
            k: CONTEXT_JOBS_K,
            exclude_id: None,
            max_results: CONTEXT_JOBS_K,
        })
        .await?;

    Ok(results.into_iter().map(|r| r.description).collect())
}

pub fn build_recommendation_prompt(
    request: &AgentRequest,
    analysis: &ResumeAnalysis,
    similar_jobs: &[String],
) -> String {
    let skills = analysis.skills.join(", ");
    let snippets = if similar_jobs.is_empty() {
        "None".to_string()
    } else {
        similar_jobs.join(SNIPPET_SEPARATOR)
    };

    fill_template(
        RECOMMENDATION_PROMPT_TEMPLATE,
        &[
            ("user_goal", &request.user_goal),
            ("skills", &skills),
            ("summary", &analysis.summary),
            ("job_description", &request.job_description),
            ("similar_jobs", &snippets),
        ],
    )
}

/// Stage 3. The model's text is the recommendation, unmodified.
pub async fn generate_recommendation(
    llm: &dyn InferenceProvider,
    request: &AgentRequest,
    analysis: &ResumeAnalysis,
    similar_jobs: &[String],
) -> Result<String, AppError> {
    let prompt = build_recommendation_prompt(request, analysis, similar_jobs);
    llm.complete(&prompt, "")
        .await
        .map_err(|e| AppError::Llm(format!("Recommendation generation failed: {e}")))
}

#[derive(Clone)]
pub struct RecommendationPipeline {
    llm: Arc<dyn InferenceProvider>,
    retrieval: TenantRetrieval,
}

impl RecommendationPipeline {
    pub fn new(llm: Arc<dyn InferenceProvider>, retrieval: TenantRetrieval) -> Self {
        Self { llm, retrieval }
    }

    pub async fn run(&self, request: &AgentRequest) -> Result<PipelineOutcome, AppError> {
        info!("Pipeline stage 1: analyzing resume");
        let analysis = analyze_resume(self.llm.as_ref(), &request.resume_text).await?;

        info!("Pipeline stage 2: retrieving similar jobs for tenant {}", request.tenant_id);
        let similar_jobs =
            find_similar_jobs(&self.retrieval, &request.tenant_id, &request.job_description)
                .await?;

        info!(
            "Pipeline stage 3: generating recommendation ({} context jobs)",
            similar_jobs.len()
        );
        let recommendation =
            generate_recommendation(self.llm.as_ref(), request, &analysis, &similar_jobs).await?;

        Ok(PipelineOutcome {
            analysis,
            similar_jobs,
            recommendation,
        })
    }
}
