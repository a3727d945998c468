use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resume::CompileError;
use crate::vector::VectorError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Vector store error: {0}")]
    Vector(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    #[error("LaTeX compilation failed: {0}")]
    CompilationFailed(String),

    #[error("PDF file was not generated after successful compilation")]
    ArtifactMissing,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<VectorError> for AppError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::StoreUnavailable(msg) => AppError::StoreUnavailable(msg),
            VectorError::Embedding(_) | VectorError::DimensionMismatch { .. } => {
                AppError::Embedding(err.to_string())
            }
            other => AppError::Vector(other.to_string()),
        }
    }
}

impl From<CompileError> for AppError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::CompilationFailed { log } => AppError::CompilationFailed(log),
            CompileError::ArtifactMissing => AppError::ArtifactMissing,
            CompileError::Io(e) => {
                AppError::Internal(anyhow::Error::new(e).context("LaTeX scratch directory"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Invalid or missing API key".to_string(),
            ),
            AppError::StoreUnavailable(msg) => {
                tracing::error!("Vector store unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The vector store is unavailable, please retry".to_string(),
                )
            }
            AppError::Vector(msg) => {
                tracing::error!("Vector store error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "VECTOR_STORE_ERROR",
                    "Could not perform similarity search".to_string(),
                )
            }
            AppError::Embedding(msg) => {
                tracing::error!("Embedding error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EMBEDDING_ERROR",
                    "Could not compute text embedding".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::MalformedModelOutput(msg) => {
                tracing::error!("Malformed model output: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_MODEL_OUTPUT",
                    "The AI model returned output that could not be parsed".to_string(),
                )
            }
            AppError::CompilationFailed(log) => {
                tracing::warn!("LaTeX compilation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMPILATION_FAILED",
                    format!("LaTeX compilation failed: {log}"),
                )
            }
            AppError::ArtifactMissing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ARTIFACT_MISSING",
                "PDF file was not generated after successful compilation.".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
