use crate::{Error, Result, dify::UploadFile};
use chrono::NaiveDate;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    Flashcard,
    StudyPlanner,
}

impl WorkflowStep {
    /// Value of the `step` input variable expected by the Dify workflow.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flashcard => "flashcard",
            Self::StudyPlanner => "study planner",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStep {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flashcard" => Ok(Self::Flashcard),
            "study planner" => Ok(Self::StudyPlanner),
            other => Err(Error::validation(format!(
                "unknown step '{}', expected 'flashcard' or 'study planner'",
                other
            ))),
        }
    }
}

/// Raw fields of a `/workflow` form submission.
#[derive(Debug, Clone, Default)]
pub struct WorkflowForm {
    pub step: Option<String>,
    pub file: Option<UploadFile>,
    pub flashcard_type: Option<String>,
    pub planner_prompt: Option<String>,
}

/// The branch a workflow request resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowPlan {
    FlashcardsFromFile(UploadFile),
    FlashcardsFromType(String),
    StudyPlanner(String),
}

impl WorkflowPlan {
    pub fn from_form(form: WorkflowForm) -> Result<Self> {
        let step: WorkflowStep = form
            .step
            .ok_or_else(|| Error::validation("step is required"))?
            .parse()?;

        match step {
            WorkflowStep::Flashcard => match form.file {
                Some(file) => Ok(Self::FlashcardsFromFile(file)),
                None => non_blank(form.flashcard_type)
                    .map(Self::FlashcardsFromType)
                    .ok_or_else(|| {
                        Error::validation("flashcard step requires a file or a flashcard_type")
                    }),
            },
            WorkflowStep::StudyPlanner => non_blank(form.planner_prompt)
                .map(Self::StudyPlanner)
                .ok_or_else(|| Error::validation("study planner step requires a planner_prompt")),
        }
    }

    pub fn step(&self) -> WorkflowStep {
        match self {
            Self::FlashcardsFromFile(_) | Self::FlashcardsFromType(_) => WorkflowStep::Flashcard,
            Self::StudyPlanner(_) => WorkflowStep::StudyPlanner,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Gives the planner model a reference date, since it has no clock of its own.
pub fn dated_planner_prompt(prompt: &str, today: NaiveDate) -> String {
    format!("today date is {} {}", today, prompt)
}
