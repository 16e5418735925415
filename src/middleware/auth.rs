//! Shared-secret bearer authentication for the webhook.
//!
//! The presented token must equal `PROCESS_HOOK_TOKEN` exactly. With no
//! token configured every request is rejected.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::models::AppState;
use crate::types::{AppError, AppResult};

pub async fn require_bearer_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let configured = state.config.auth.process_hook_token.as_deref();

    if !verify_token(presented, configured) {
        warn!(
            path = %req.uri().path(),
            token_present = presented.is_some(),
            "Rejected webhook call"
        );
        return Err(AppError::Auth("invalid or missing bearer token".to_string()));
    }

    Ok(next.run(req).await)
}

/// Token part of an `Authorization: Bearer <token>` value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Exact, constant-time match. Fails closed when nothing is configured.
pub fn verify_token(presented: Option<&str>, configured: Option<&str>) -> bool {
    match (presented, configured) {
        (Some(presented), Some(configured)) if !configured.is_empty() => {
            // Hashing first gives equal-length inputs to the comparison.
            let a = Sha256::digest(presented.as_bytes());
            let b = Sha256::digest(configured.as_bytes());
            constant_time_compare(&a, &b)
        }
        _ => false,
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (byte_a, byte_b) in a.iter().zip(b.iter()) {
        result |= byte_a ^ byte_b;
    }
    result == 0
}
