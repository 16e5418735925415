//! Shared helpers for router-level tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use esg_hook::{create_router, AppState, Config};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use tower::ServiceExt;

pub const TOKEN: &str = "s3cret-hook-token";

/// Nothing listens on port 1, so connections are refused immediately.
pub const UNREACHABLE_ORACLE: &str = "http://127.0.0.1:1/v1";

pub struct TestApp {
    pub router: Router,
    pub files_root: PathBuf,
}

pub fn config(files_root: &Path, token: Option<&str>, oracle_url: &str, api_key: Option<&str>) -> Config {
    let mut config = Config::default();
    config.storage.files_root = files_root.to_path_buf();
    config.auth.process_hook_token = token.map(str::to_string);
    config.llm.base_url = oracle_url.to_string();
    config.llm.openai_api_key = api_key.map(str::to_string);
    config.llm.model = "test-model".to_string();
    config.llm.timeout_secs = 10;
    config
}

pub fn spawn_app(config: Config) -> TestApp {
    std::fs::create_dir_all(&config.storage.files_root).unwrap();
    spawn_app_unchecked(config)
}

/// Like `spawn_app`, but leaves the files root exactly as the caller set it up.
pub fn spawn_app_unchecked(config: Config) -> TestApp {
    let files_root = config.storage.files_root.clone();
    let state = AppState::new(config).unwrap();
    TestApp {
        router: create_router(state),
        files_root,
    }
}

impl TestApp {
    pub async fn post_webhook(&self, token: Option<&str>, body: impl Into<String>) -> (StatusCode, Value) {
        self.post_webhook_as(token, Some("application/json"), body).await
    }

    /// Webhook call with an arbitrary (or no) `content-type` header.
    pub async fn post_webhook_as(
        &self,
        token: Option<&str>,
        content_type: Option<&str>,
        body: impl Into<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("POST").uri("/tally-webhook");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = builder.body(Body::from(body.into())).unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String, Option<String>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string(), content_type)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Job directories currently on disk.
    pub fn job_dirs(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.files_root) {
            Ok(entries) => entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// A one-page PDF whose only text is `text`.
pub fn sample_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A chat-completion response body carrying `content`.
pub fn completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

/// Count data rows of a CSV document, checking every row has `columns` fields.
pub fn csv_rows(text: &str, columns: usize) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    assert_eq!(reader.headers().unwrap().len(), columns);
    reader
        .records()
        .map(|r| {
            let record = r.unwrap();
            assert_eq!(record.len(), columns);
            record
        })
        .count()
}
