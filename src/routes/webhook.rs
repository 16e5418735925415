use axum::{
    extract::State,
    middleware,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde_json::Value;
use tracing::info;

use crate::agents::execute_report_pipeline;
use crate::middleware::require_bearer_token;
use crate::models::{AppState, WebhookPayload, WebhookResponse};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tally-webhook", post(handle_webhook))
        .route("/api/webhook", post(handle_webhook))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer_token))
        .with_state(state)
}

// The body is read raw so any content type is accepted and bad JSON maps to 400.
async fn handle_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let value: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidRequest(format!("body is not valid JSON: {}", e)))?;
    let payload = WebhookPayload::from_json(&value)?;

    info!(company = %payload.company, "Webhook accepted");

    let response = execute_report_pipeline(&state, &payload).await?;
    Ok(Json(response))
}
