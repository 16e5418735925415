//! Artifact Serving
//!
//! Serves the files a job produced, plus a small HTML dashboard per job.
//! Only known artifact names under UUID job directories are reachable.

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::agents::ScenarioTable;
use crate::models::AppState;
use crate::storage::{content_type_for, BRIEF_FILE, SCENARIOS_FILE};
use crate::types::AppResult;
use crate::utils::escape_html;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/files/{job_id}/", get(job_dashboard))
        .route("/files/{job_id}/{artifact}", get(serve_artifact))
        .with_state(state)
}

async fn serve_artifact(
    State(state): State<AppState>,
    Path((job_id, artifact)): Path<(String, String)>,
    req: Request,
) -> AppResult<Response> {
    let path = state.store.artifact_path(&job_id, &artifact).await?;
    debug!(job_id = %job_id, artifact = %artifact, "Serving artifact");

    let mut response = ServeFile::new(&path)
        .oneshot(req)
        .await
        .unwrap_or_else(|never| match never {})
        .into_response();

    if let Some(content_type) = content_type_for(&artifact) {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    Ok(response)
}

async fn job_dashboard(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Html<String>> {
    let job_path = state.store.job_path(&job_id).await?;

    let has_brief = tokio::fs::try_exists(job_path.join(BRIEF_FILE))
        .await
        .unwrap_or(false);
    let scenarios = tokio::fs::read_to_string(job_path.join(SCENARIOS_FILE)).await.ok();

    Ok(Html(render_dashboard(&job_id, has_brief, scenarios.as_deref())))
}

fn render_dashboard(job_id: &str, has_brief: bool, scenarios: Option<&str>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"pt\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>Job {}</title>\n", escape_html(job_id)));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>Job {}</h1>\n<ul>\n", escape_html(job_id)));
    if has_brief {
        html.push_str(&format!("<li><a href=\"{0}\">{0}</a></li>\n", BRIEF_FILE));
    }
    if scenarios.is_some() {
        html.push_str(&format!("<li><a href=\"{0}\">{0}</a></li>\n", SCENARIOS_FILE));
    }
    html.push_str("</ul>\n");

    match scenarios.map(ScenarioTable::parse) {
        Some(Ok(table)) => {
            html.push_str("<table>\n<thead><tr>");
            for header in &table.headers {
                html.push_str(&format!("<th>{}</th>", escape_html(header)));
            }
            html.push_str("</tr></thead>\n<tbody>\n");
            for row in &table.rows {
                html.push_str("<tr>");
                for cell in row {
                    html.push_str(&format!("<td>{}</td>", escape_html(cell)));
                }
                html.push_str("</tr>\n");
            }
            html.push_str("</tbody>\n</table>\n");
        }
        Some(Err(_)) => {
            if let Some(raw) = scenarios {
                html.push_str(&format!("<pre>{}</pre>\n", escape_html(raw)));
            }
        }
        None => html.push_str("<p>Cenários indisponíveis.</p>\n"),
    }

    html.push_str("</body>\n</html>\n");
    html
}
