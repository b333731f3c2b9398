use aistudy_proxy::{
    Error, Result,
    dify::{
        ChatMessageRequest, ChatMessageResponse, DifyApi, UploadRequest, UploadedFile,
        WorkflowRunRequest, WorkflowRunResponse,
    },
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted Dify fake that records every outbound request
#[derive(Default)]
pub struct RecordingDify {
    chat_results: Mutex<VecDeque<Result<ChatMessageResponse>>>,
    upload_results: Mutex<VecDeque<Result<UploadedFile>>>,
    workflow_results: Mutex<VecDeque<Result<WorkflowRunResponse>>>,
    pub chat_requests: Mutex<Vec<ChatMessageRequest>>,
    pub upload_requests: Mutex<Vec<UploadRequest>>,
    pub workflow_requests: Mutex<Vec<WorkflowRunRequest>>,
}

impl RecordingDify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, result: Result<ChatMessageResponse>) -> Self {
        self.chat_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_upload(self, result: Result<UploadedFile>) -> Self {
        self.upload_results.lock().unwrap().push_back(result);
        self
    }

    pub fn with_workflow(self, result: Result<WorkflowRunResponse>) -> Self {
        self.workflow_results.lock().unwrap().push_back(result);
        self
    }

    pub fn chat_requests(&self) -> Vec<ChatMessageRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn upload_requests(&self) -> Vec<UploadRequest> {
        self.upload_requests.lock().unwrap().clone()
    }

    pub fn workflow_requests(&self) -> Vec<WorkflowRunRequest> {
        self.workflow_requests.lock().unwrap().clone()
    }
}

fn next<T>(queue: &Mutex<VecDeque<Result<T>>>, stage: &str) -> Result<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(Error::internal(format!("No scripted {} response", stage))))
}

#[async_trait]
impl DifyApi for RecordingDify {
    async fn send_chat_message(&self, request: ChatMessageRequest) -> Result<ChatMessageResponse> {
        self.chat_requests.lock().unwrap().push(request);
        next(&self.chat_results, "chat")
    }

    async fn upload_file(&self, request: UploadRequest) -> Result<UploadedFile> {
        self.upload_requests.lock().unwrap().push(request);
        next(&self.upload_results, "upload")
    }

    async fn run_workflow(&self, request: WorkflowRunRequest) -> Result<WorkflowRunResponse> {
        self.workflow_requests.lock().unwrap().push(request);
        next(&self.workflow_results, "workflow")
    }
}
