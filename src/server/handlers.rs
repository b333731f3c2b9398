use super::types::{ErrorResponse, HealthResponse};
use crate::{
    Error, Result,
    chat::{self, ChatInput, ChatReply},
    config::Config,
    dify::{DifyApi, UploadFile},
    workflow::{WorkflowForm, WorkflowPlan, WorkflowRunner},
};
use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Clone)]
pub struct AppState {
    pub dify: Arc<dyn DifyApi>,
    pub chat_user: String,
    pub workflows: Arc<WorkflowRunner>,
    /// Largest document accepted on `/workflow`
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(dify: Arc<dyn DifyApi>, config: &Config) -> Self {
        let workflows = WorkflowRunner::new(dify.clone(), config.dify.workflow_user.clone());
        Self {
            dify,
            chat_user: config.dify.chat_user.clone(),
            workflows: Arc::new(workflows),
            max_upload_bytes: config.server.max_upload_bytes,
        }
    }
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn failure(request_id: Uuid, e: Error) -> HandlerError {
    let status = e.status_code();
    if status.is_server_error() {
        error!("[{}] Request failed: {}", request_id, e);
    } else {
        warn!("[{}] Request rejected: {}", request_id, e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatInput>, JsonRejection>,
) -> std::result::Result<Json<ChatReply>, HandlerError> {
    let request_id = Uuid::new_v4();
    let Json(input) = payload.map_err(|e| failure(request_id, e.into()))?;
    info!(
        "[{}] Received chat message (conversation: {})",
        request_id,
        input.conversation_id.as_deref().unwrap_or("new")
    );

    chat::relay(state.dify.as_ref(), input, &state.chat_user)
        .await
        .map(Json)
        .map_err(|e| failure(request_id, e))
}

pub async fn workflow(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<Value>, HandlerError> {
    let request_id = Uuid::new_v4();
    let multipart = multipart.map_err(|e| failure(request_id, e.into()))?;

    let plan = read_workflow_form(multipart, state.max_upload_bytes)
        .await
        .and_then(WorkflowPlan::from_form)
        .map_err(|e| failure(request_id, e))?;

    info!(
        "[{}] Received workflow request for step '{}'",
        request_id,
        plan.step()
    );

    state
        .workflows
        .run(plan)
        .await
        .map(Json)
        .map_err(|e| failure(request_id, e))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn malformed(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::payload_too_large(e.body_text());
    }
    Error::validation(format!("malformed multipart body: {}", e.body_text()))
}

async fn read_workflow_form(mut multipart: Multipart, max_file_bytes: usize) -> Result<WorkflowForm> {
    let mut form = WorkflowForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "step" => form.step = Some(field.text().await.map_err(malformed)?),
            "flashcard_type" => form.flashcard_type = Some(field.text().await.map_err(malformed)?),
            "planner_prompt" => form.planner_prompt = Some(field.text().await.map_err(malformed)?),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await.map_err(malformed)?;

                // Browsers submit an empty unnamed part for an untouched file input
                if file_name.is_empty() && bytes.is_empty() {
                    debug!("Ignoring empty file field");
                    continue;
                }

                if bytes.len() > max_file_bytes {
                    return Err(Error::payload_too_large(format!(
                        "file is {} bytes, limit is {} bytes",
                        bytes.len(),
                        max_file_bytes
                    )));
                }

                form.file = Some(UploadFile {
                    file_name: if file_name.is_empty() {
                        "upload".to_string()
                    } else {
                        file_name
                    },
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => warn!("Ignoring unknown workflow field: {}", other),
        }
    }

    Ok(form)
}
