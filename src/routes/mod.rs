//! API Routes
//!
//! - `POST /tally-webhook` (also `/api/webhook`) - run a report job
//! - `GET /files/{job_id}/` - job dashboard
//! - `GET /files/{job_id}/{artifact}` - generated artifacts
//! - `GET /api/health` - health check

pub mod webhook;
pub mod files;
pub mod health;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(webhook::router(state.clone()))
        .merge(files::router(state.clone()))
        .merge(health::router(state))
        .layer(TraceLayer::new_for_http());

    apply_cors(router, &origins)
}
