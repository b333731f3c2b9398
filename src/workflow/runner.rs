use super::plan::{WorkflowPlan, dated_planner_prompt};
use crate::{
    Result,
    dify::{DifyApi, StudyMaterial, UploadFile, UploadRequest, WorkflowInputs, WorkflowRunRequest},
};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub struct WorkflowRunner {
    dify: Arc<dyn DifyApi>,
    user: String,
}

impl WorkflowRunner {
    pub fn new(dify: Arc<dyn DifyApi>, user: impl Into<String>) -> Self {
        Self {
            dify,
            user: user.into(),
        }
    }

    /// Executes the plan and returns the workflow's decoded output.
    pub async fn run(&self, plan: WorkflowPlan) -> Result<Value> {
        self.run_on(plan, Local::now().date_naive()).await
    }

    /// Same as [`run`](Self::run) with an explicit calendar date for the
    /// planner prefix.
    pub async fn run_on(&self, plan: WorkflowPlan, today: NaiveDate) -> Result<Value> {
        let step = plan.step();
        let mut inputs = WorkflowInputs::new(step.as_str());

        match plan {
            WorkflowPlan::FlashcardsFromFile(file) => {
                let upload_file_id = self.upload(file).await?;
                inputs.study_material = Some(StudyMaterial::uploaded_document(upload_file_id));
            }
            WorkflowPlan::FlashcardsFromType(flashcard_type) => {
                debug!("Generating '{}' flashcards", flashcard_type);
                inputs.flashcard_type = Some(flashcard_type);
            }
            WorkflowPlan::StudyPlanner(prompt) => {
                inputs.planner_prompt = Some(dated_planner_prompt(&prompt, today));
            }
        }

        let response = self
            .dify
            .run_workflow(WorkflowRunRequest::blocking(inputs, &self.user))
            .await?;

        info!(
            "Workflow step '{}' finished with status {} (run id: {})",
            step,
            response.data.status.as_deref().unwrap_or("unknown"),
            response.workflow_run_id.as_deref().unwrap_or("unknown")
        );

        response.output_payload()
    }

    async fn upload(&self, file: UploadFile) -> Result<String> {
        let uploaded = self
            .dify
            .upload_file(UploadRequest {
                file,
                user: self.user.clone(),
            })
            .await?;

        info!("Uploaded study material as file {}", uploaded.id);
        Ok(uploaded.id)
    }
}
