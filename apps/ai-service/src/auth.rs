//! Shared-secret bearer authentication for business routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::state::AppState;

/// Extracts the token from `Authorization: Bearer <token>`. The scheme is case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

/// Compares without short-circuiting on the first differing byte.
fn secrets_match(given: &str, expected: &str) -> bool {
    let (given, expected) = (given.as_bytes(), expected.as_bytes());
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Rejects the request with 403 unless it carries the configured API key.
pub async fn require_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match bearer_token(&headers) {
        Some(token) if secrets_match(token, &state.config.ai_service_api_key) => {
            Ok(next.run(request).await)
        }
        Some(_) => {
            tracing::debug!("Rejected request with invalid API key");
            Err(AppError::Forbidden)
        }
        None => {
            tracing::debug!("Rejected request without bearer token");
            Err(AppError::Forbidden)
        }
    }
}
