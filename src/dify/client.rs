use super::types::*;
use crate::{Error, Result, config::DifyConfig};
use async_trait::async_trait;
use reqwest::{StatusCode, multipart};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

/// The three Dify endpoints the proxy talks to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DifyApi: Send + Sync {
    async fn send_chat_message(&self, request: ChatMessageRequest) -> Result<ChatMessageResponse>;

    async fn upload_file(&self, request: UploadRequest) -> Result<UploadedFile>;

    async fn run_workflow(&self, request: WorkflowRunRequest) -> Result<WorkflowRunResponse>;
}

pub struct DifyClient {
    client: reqwest::Client,
    chat_url: String,
    workflow_url: String,
    upload_url: String,
    chat_api_key: String,
    workflow_api_key: String,
}

impl DifyClient {
    pub fn new(config: &DifyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            workflow_url: config.workflow_url(),
            upload_url: config.file_upload_url(),
            chat_api_key: config.chat_api_key.clone(),
            workflow_api_key: config.workflow_api_key.clone(),
        })
    }
}

/// Checks the status against what the endpoint documents for success and
/// parses the body.
async fn read_reply<T: DeserializeOwned>(
    response: reqwest::Response,
    stage: &str,
    accepted: fn(StatusCode) -> bool,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !accepted(status) {
        error!("Dify {} failed with status {}: {}", stage, status, body);
        return Err(Error::rejected(stage, status.as_u16(), body));
    }

    debug!("Dify {} succeeded with status {}", stage, status);
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl DifyApi for DifyClient {
    async fn send_chat_message(&self, request: ChatMessageRequest) -> Result<ChatMessageResponse> {
        debug!(
            "Sending chat message (continuing conversation: {})",
            request.conversation_id.is_some()
        );

        let response = self
            .client
            .post(&self.chat_url)
            .bearer_auth(&self.chat_api_key)
            .json(&request)
            .send()
            .await?;

        read_reply(response, "chat message", |status| status.is_success()).await
    }

    async fn upload_file(&self, request: UploadRequest) -> Result<UploadedFile> {
        let UploadRequest { file, user } = request;
        debug!(
            "Uploading {} ({}, {} bytes)",
            file.file_name,
            file.content_type,
            file.bytes.len()
        );

        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| {
                Error::validation(format!("invalid content type '{}': {}", file.content_type, e))
            })?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("user", user)
            .text("type", file.content_type);

        let response = self
            .client
            .post(&self.upload_url)
            .bearer_auth(&self.workflow_api_key)
            .multipart(form)
            .send()
            .await?;

        read_reply(response, "file upload", |status| status == StatusCode::CREATED).await
    }

    async fn run_workflow(&self, request: WorkflowRunRequest) -> Result<WorkflowRunResponse> {
        debug!("Running workflow step '{}'", request.inputs.step);

        let response = self
            .client
            .post(&self.workflow_url)
            .bearer_auth(&self.workflow_api_key)
            .json(&request)
            .send()
            .await?;

        read_reply(response, "workflow run", |status| status == StatusCode::OK).await
    }
}
