//! Rewrites a LaTeX resume's prose for a target job.
//!
//! Structural preservation is requested from the model, not verified here.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::fill_template;
use crate::llm_client::{strip_code_fences, InferenceProvider};
use crate::resume::prompts::REBUILD_PROMPT_TEMPLATE;

/// Returns the model's LaTeX with at most one wrapping code fence removed.
pub async fn rebuild_latex(
    llm: &dyn InferenceProvider,
    latex_source: &str,
    job_description: &str,
) -> Result<String, AppError> {
    let prompt = fill_template(
        REBUILD_PROMPT_TEMPLATE,
        &[
            ("job_description", job_description),
            ("latex_source", latex_source),
        ],
    );

    let text = llm
        .complete(&prompt, "")
        .await
        .map_err(|e| AppError::Llm(format!("LaTeX rebuild failed: {e}")))?;

    let trimmed = text.trim();
    let latex = if trimmed.starts_with("```") {
        strip_code_fences(trimmed).to_string()
    } else {
        text
    };

    info!(
        "Rebuilt LaTeX resume ({} -> {} bytes)",
        latex_source.len(),
        latex.len()
    );
    Ok(latex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmError, MockInferenceProvider};

    const SOURCE: &str = "\\documentclass{article}\n\\begin{document}\nOld summary\n\\end{document}";

    #[tokio::test]
    async fn test_prompt_carries_source_and_job() {
        let mut llm = MockInferenceProvider::new();
        llm.expect_complete()
            .withf(|prompt, _| {
                prompt.contains("Old summary")
                    && prompt.contains("Staff Rust engineer")
                    && prompt.contains("**DO NOT** change the LaTeX structure")
            })
            .times(1)
            .returning(|_, _| Ok(SOURCE.to_string()));

        let latex = rebuild_latex(&llm, SOURCE, "Staff Rust engineer").await.unwrap();
        assert_eq!(latex, SOURCE);
    }

    #[tokio::test]
    async fn test_wrapping_fence_is_removed() {
        let mut llm = MockInferenceProvider::new();
        llm.expect_complete()
            .returning(|_, _| Ok(format!("```latex\n{SOURCE}\n```\n")));

        let latex = rebuild_latex(&llm, SOURCE, "job").await.unwrap();
        assert_eq!(latex, SOURCE);
    }

    #[tokio::test]
    async fn test_unfenced_output_is_returned_verbatim() {
        let mut llm = MockInferenceProvider::new();
        llm.expect_complete()
            .returning(|_, _| Ok(format!("{SOURCE}\n")));

        let latex = rebuild_latex(&llm, SOURCE, "job").await.unwrap();
        assert_eq!(latex, format!("{SOURCE}\n"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_llm_error() {
        let mut llm = MockInferenceProvider::new();
        llm.expect_complete()
            .returning(|_, _| Err(LlmError::Blocked("SAFETY".to_string())));

        let err = rebuild_latex(&llm, SOURCE, "job").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
