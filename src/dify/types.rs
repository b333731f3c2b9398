use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Only blocking mode is used; the proxy never relays event streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Blocking,
}

/// Body of `POST /chat-messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessageRequest {
    pub inputs: Map<String, Value>,
    pub query: String,
    pub user: String,
    pub response_mode: ResponseMode,
    pub files: Vec<Value>,
    /// Absent starts a new conversation on the Dify side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ChatMessageRequest {
    pub fn blocking(
        query: impl Into<String>,
        user: impl Into<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            inputs: Map::new(),
            query: query.into(),
            user: user.into(),
            response_mode: ResponseMode::Blocking,
            files: Vec::new(),
            conversation_id: conversation_id.filter(|id| !id.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessageResponse {
    pub conversation_id: String,
    /// Dify may omit the key or send `null`
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// A file received from the app, held fully in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub file: UploadFile,
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Body of `POST /workflows/run`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowRunRequest {
    pub inputs: WorkflowInputs,
    pub response_mode: ResponseMode,
    pub user: String,
}

impl WorkflowRunRequest {
    pub fn blocking(inputs: WorkflowInputs, user: impl Into<String>) -> Self {
        Self {
            inputs,
            response_mode: ResponseMode::Blocking,
            user: user.into(),
        }
    }
}

/// Input variables of the study workflow. Only the keys relevant to the
/// selected step are sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowInputs {
    pub step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_material: Option<StudyMaterial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashcard_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planner_prompt: Option<String>,
}

impl WorkflowInputs {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            study_material: None,
            flashcard_type: None,
            planner_prompt: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyMaterial {
    pub transfer_method: String,
    pub upload_file_id: String,
    #[serde(rename = "type")]
    pub file_type: String,
}

impl StudyMaterial {
    /// Reference to a document previously sent to `/files/upload`.
    pub fn uploaded_document(upload_file_id: impl Into<String>) -> Self {
        Self {
            transfer_method: "local_file".to_string(),
            upload_file_id: upload_file_id.into(),
            file_type: "document".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunResponse {
    #[serde(default)]
    pub workflow_run_id: Option<String>,
    pub data: WorkflowRunData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunData {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub outputs: Option<Map<String, Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl WorkflowRunResponse {
    /// Decodes `data.outputs.text`.
    ///
    /// The workflow's end node emits its result as a JSON document serialized
    /// into a string, so the field has to be parsed a second time.
    pub fn output_payload(&self) -> Result<Value> {
        let text = self
            .data
            .outputs
            .as_ref()
            .and_then(|outputs| outputs.get("text"))
            .ok_or_else(|| match &self.data.error {
                Some(error) => Error::unexpected_payload(format!(
                    "workflow finished without output: {}",
                    error
                )),
                None => Error::unexpected_payload("missing data.outputs.text"),
            })?;

        let text = text
            .as_str()
            .ok_or_else(|| Error::unexpected_payload("data.outputs.text is not a string"))?;

        Ok(serde_json::from_str(text)?)
    }
}
