//! Axum route handlers for resume tailoring and PDF rendering.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resume::rebuild::rebuild_latex;
use crate::state::AppState;

pub const PDF_FILENAME: &str = "generated_resume.pdf";

#[derive(Debug, Deserialize)]
pub struct RebuildLatexRequest {
    pub latex_source: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct RebuildLatexResponse {
    pub modified_latex: String,
}

#[derive(Debug, Deserialize)]
pub struct CompileLatexRequest {
    pub latex_source: String,
}

/// POST /rebuild-resume-latex
pub async fn handle_rebuild_latex(
    State(state): State<AppState>,
    Json(request): Json<RebuildLatexRequest>,
) -> Result<Json<RebuildLatexResponse>, AppError> {
    if request.latex_source.trim().is_empty() {
        return Err(AppError::Validation("latex_source cannot be empty".to_string()));
    }
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let modified_latex = rebuild_latex(
        state.llm.as_ref(),
        &request.latex_source,
        &request.job_description,
    )
    .await?;

    Ok(Json(RebuildLatexResponse { modified_latex }))
}

/// POST /compile-latex-to-pdf
///
/// Returns the PDF as an attachment, or the toolchain log on failure.
pub async fn handle_compile_latex(
    State(state): State<AppState>,
    Json(request): Json<CompileLatexRequest>,
) -> Result<Response, AppError> {
    if request.latex_source.trim().is_empty() {
        return Err(AppError::Validation("latex_source cannot be empty".to_string()));
    }

    let pdf = state.compiler.compile(&request.latex_source).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{PDF_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
