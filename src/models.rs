use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::config::Config;
use crate::llm::LLM;
use crate::storage::JobStore;
use crate::types::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: LLM,
    /// Client for document downloads.
    pub http: reqwest::Client,
    pub store: JobStore,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let llm = LLM::from_config(&config.llm)?;
        Self::with_llm(config, llm)
    }

    /// Build state around an already constructed oracle.
    pub fn with_llm(config: Config, llm: LLM) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.storage.download_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        let store = JobStore::new(
            config.storage.files_root.clone(),
            config.storage.public_base_url.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            llm,
            http,
            store,
        })
    }
}

/// Keys that may carry the report, in lookup order. Direct file keys come first.
pub const DOCUMENT_KEYS: [&str; 5] = ["report_url", "file_url", "pdf_url", "report_link", "link"];

pub const DEFAULT_FOCUS: &str = "Estratégia";
pub const DEFAULT_HORIZON: &str = "6 meses";
pub const DEFAULT_LANGUAGE: &str = "pt";

/// Normalized webhook submission.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WebhookPayload {
    pub name: String,
    pub company: String,
    pub email: String,
    pub focus: String,
    pub horizon: String,
    pub language: String,
    pub document_reference: String,
}

impl WebhookPayload {
    pub fn from_json(value: &Value) -> AppResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AppError::InvalidRequest("payload must be a JSON object".to_string()))?;

        let field = |key: &str| object.get(key).and_then(text_value);

        let document_reference = DOCUMENT_KEYS
            .iter()
            .find_map(|key| field(*key))
            .ok_or_else(|| {
                AppError::InvalidRequest(format!(
                    "missing document reference (send one of: {})",
                    DOCUMENT_KEYS.join(", ")
                ))
            })?;

        Ok(Self {
            name: field("name").unwrap_or_default(),
            company: field("company").unwrap_or_default(),
            email: field("email").unwrap_or_default(),
            focus: field("focus").unwrap_or_else(|| DEFAULT_FOCUS.to_string()),
            horizon: field("horizon").unwrap_or_else(|| DEFAULT_HORIZON.to_string()),
            language: field("language").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            document_reference,
        })
    }
}

/// Text of a payload value. File-upload fields arrive as `[{"url": ...}]`.
fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => return items.first().and_then(text_value),
        Value::Object(map) => return map.get("url").and_then(text_value),
        Value::Null => return None,
    };
    (!text.is_empty()).then_some(text)
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WebhookResponse {
    pub brief_pdf_url: String,
    pub dashboard_url: String,
    pub benchmark_pdf_url: Option<String>,
    pub scenarios_csv_url: String,
    pub job_id: uuid::Uuid,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub oracle_configured: bool,
    pub files_root: String,
}
