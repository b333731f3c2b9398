use aistudy_proxy::{
    config::{Config, DifyConfig, LogsConfig, ServerConfig},
    dify::{ChatMessageResponse, DifyApi, UploadedFile, WorkflowRunResponse},
    server::{self, handlers::AppState},
};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;

/// Create a test configuration pointing at `base_url`
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        dify: DifyConfig {
            base_url: base_url.to_string(),
            chat_api_key: "app-chat-key".to_string(),
            workflow_api_key: "app-work-key".to_string(),
            upload_url: None,
            chat_user: "siu".to_string(),
            workflow_user: "user".to_string(),
            timeout_secs: 5,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            logs: LogsConfig {
                level: "debug".to_string(),
            },
            max_upload_bytes: 1024 * 1024,
        },
    }
}

/// Router wired to the given Dify implementation
pub fn create_test_app(dify: Arc<dyn DifyApi>) -> Router {
    let config = create_test_config("http://dify.invalid/v1");
    let state = AppState::new(dify, &config);
    server::router(state)
}

/// Create a test config YAML file
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content).await.unwrap();
    config_path.to_string_lossy().to_string()
}

pub fn chat_response(conversation_id: &str, answer: &str) -> ChatMessageResponse {
    ChatMessageResponse {
        conversation_id: conversation_id.to_string(),
        answer: Some(answer.to_string()),
        message_id: Some("msg-1".to_string()),
    }
}

pub fn uploaded_file(id: &str) -> UploadedFile {
    serde_json::from_value(json!({
        "id": id,
        "name": "lecture.pdf",
        "size": 16,
        "extension": "pdf",
        "mime_type": "application/pdf"
    }))
    .unwrap()
}

/// Workflow reply whose `outputs.text` carries `text` verbatim
pub fn workflow_response(text: &str) -> WorkflowRunResponse {
    serde_json::from_value(json!({
        "workflow_run_id": "run-1",
        "data": {
            "status": "succeeded",
            "outputs": {"text": text}
        }
    }))
    .unwrap()
}

pub const FLASHCARDS_TEXT: &str =
    r#"{"cards":[{"question":"What is ATP?","answer":"The cell's energy currency"}]}"#;

pub const STUDY_PLAN_TEXT: &str =
    r#"{"study_plan":[{"date":"2025-02-01","tasks":[{"subject":"Biology","duration":60}]}]}"#;

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9000
  max_upload_bytes: 2048
  logs:
    level: "debug"

dify:
  base_url: "https://api.dify.ai/v1"
  chat_api_key: "app-chat-key"
  workflow_api_key: "app-work-key"
  workflow_user: "study-app"
  timeout_secs: 30
"#;
