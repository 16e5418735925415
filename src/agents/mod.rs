//! Report Agents
//!
//! The three oracle calls that turn an ESG report into deliverables:
//!
//! - **Findings Agent**: condenses report text into KPIs, risks and opportunities
//! - **Brief Agent**: writes the one-page executive brief (HTML)
//! - **Scenario Agent**: projects three scenarios into a fixed-schema CSV
//!
//! ## Pipeline Overview
//!
//! ```text
//! Webhook payload
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Download   │  → report.pdf (direct PDF links only)
//! │  + extract  │
//! └─────────────┘
//!      │ text (possibly empty)
//!      ▼
//! ┌─────────────┐
//! │  Findings   │  → findings blob, "{}" on failure
//! └─────────────┘
//!      │
//!      ├──────────────────┐
//!      ▼                  ▼
//! ┌─────────────┐   ┌─────────────┐
//! │    Brief    │   │  Scenarios  │  → each with its own fallback
//! └─────────────┘   └─────────────┘
//!      │                  │
//!      ▼                  ▼
//!  brief.html        scenarios.csv
//! ```
//!
//! Every step after authentication and payload validation degrades to a
//! fallback instead of failing, so a job always yields both artifacts.

pub mod findings;
pub mod brief;
pub mod scenarios;

pub use brief::BriefAgent;
pub use findings::{FindingsAgent, FALLBACK_FINDINGS};
pub use scenarios::{ScenarioAgent, ScenarioTable};

use crate::documents::{self, MAX_PAGES};
use crate::models::{AppState, WebhookPayload, WebhookResponse};
use crate::storage::{JobDir, BRIEF_FILE, SCENARIOS_FILE, SOURCE_FILE};
use crate::types::AppResult;
use tracing::{info, warn};

pub const SYSTEM_PROMPT: &str = "Você é um tradutor executivo de relatórios ESG para C-level. \
Siga LGPD (evite dados pessoais). Traduza achados em linguagem de negócio. \
Entregue ROI, SROI, VAR e VBI com explicações curtas. \
Apoie-se em IFRS S1/S2, GRI e TCFD quando fizer sentido.";

/// Run one job end to end and describe where its artifacts live.
pub async fn execute_report_pipeline(
    state: &AppState,
    payload: &WebhookPayload,
) -> AppResult<WebhookResponse> {
    let job = state.store.create_job().await?;
    info!(
        job_id = %job.id,
        company = %payload.company,
        reference = %payload.document_reference,
        "Starting report pipeline"
    );

    let text = acquire_text(state, &job, &payload.document_reference).await;

    let findings = FindingsAgent::extract(&state.llm, &text)
        .await
        .unwrap_or_else(|e| {
            warn!(job_id = %job.id, error = %e, "Findings extraction failed, using empty findings");
            FALLBACK_FINDINGS.to_string()
        });

    let brief_html = BriefAgent::generate(&state.llm, payload, &findings)
        .await
        .unwrap_or_else(|e| {
            warn!(job_id = %job.id, error = %e, "Brief generation failed, using placeholder");
            BriefAgent::fallback(payload)
        });

    let scenarios_csv = ScenarioAgent::generate(&state.llm, &findings)
        .await
        .unwrap_or_else(|e| {
            warn!(job_id = %job.id, error = %e, "Scenario generation failed, using default table");
            ScenarioAgent::fallback()
        });

    state.store.write_artifact(&job, BRIEF_FILE, &brief_html).await?;
    state.store.write_artifact(&job, SCENARIOS_FILE, &scenarios_csv).await?;

    info!(job_id = %job.id, "Report pipeline complete");

    Ok(WebhookResponse {
        brief_pdf_url: state.store.artifact_url(&job.id, BRIEF_FILE),
        dashboard_url: state.store.job_url(&job.id),
        benchmark_pdf_url: None,
        scenarios_csv_url: state.store.artifact_url(&job.id, SCENARIOS_FILE),
        job_id: job.id,
    })
}

/// Report text for the job, or an empty string when none can be had.
async fn acquire_text(state: &AppState, job: &JobDir, reference: &str) -> String {
    if !documents::looks_like_pdf(reference) {
        info!(job_id = %job.id, "Reference is not a direct PDF, skipping extraction");
        return String::new();
    }

    let pdf_path = job.file(SOURCE_FILE);
    let max_bytes = state.config.storage.max_download_bytes;

    let text = match documents::download_to(&state.http, reference.trim(), &pdf_path, max_bytes).await {
        Ok(_) => documents::extract_text(&pdf_path, MAX_PAGES).await,
        Err(e) => Err(e),
    };

    if let Err(e) = tokio::fs::remove_file(&pdf_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(job_id = %job.id, error = %e, "Failed to remove downloaded report");
        }
    }

    text.unwrap_or_else(|e| {
        warn!(job_id = %job.id, error = %e, "Text extraction failed, continuing without text");
        String::new()
    })
}
