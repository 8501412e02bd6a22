// SPDX-License-Identifier: MIT

//! The triage workflow: classify, then route on confidence to the actions

use std::sync::Arc;

use super::classifier::Classifier;
use super::steps::{
    ApplyLabelStep, ApplyLowConfidenceLabelStep, ClassifyStep, RequestReviewStep, CLASSIFY,
};
use super::tools::IssueTracker;
use crate::error::TriageError;
use crate::workflow::graph::{ExecutionMode, Workflow, WorkflowBuilder};
use crate::workflow::routing::{ConfidenceRouter, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::workflow::state::{IssueState, StateSchema};

pub const DEFAULT_LABELS: [&str; 3] = ["bug", "enhancement", "question"];
pub const DEFAULT_LOW_CONFIDENCE_LABEL: &str = "low_confidence";
pub const DEFAULT_REVIEW_COMMENT: &str = "🤖 Low confidence labeling – please review.";

/// Business knobs of the triage workflow
#[derive(Debug, Clone, PartialEq)]
pub struct TriageOptions {
    pub threshold: f64,
    pub labels: Vec<String>,
    pub low_confidence_label: String,
    pub review_comment: String,
    pub execution: ExecutionMode,
    pub schema: StateSchema,
}

impl Default for TriageOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            low_confidence_label: DEFAULT_LOW_CONFIDENCE_LABEL.to_string(),
            review_comment: DEFAULT_REVIEW_COMMENT.to_string(),
            execution: ExecutionMode::default(),
            schema: StateSchema::default(),
        }
    }
}

/// Assemble the triage graph around the given ports
pub fn build_workflow(
    classifier: Arc<dyn Classifier>,
    tracker: Arc<dyn IssueTracker>,
    options: &TriageOptions,
) -> Result<Workflow, TriageError> {
    if options.labels.is_empty() {
        return Err(TriageError::config("at least one classification label is required"));
    }
    let router = ConfidenceRouter::new(options.threshold)?;

    let workflow = WorkflowBuilder::new("issue-triage")
        .add_step(Arc::new(ClassifyStep::new(classifier, &options.labels)))
        .add_step(Arc::new(ApplyLabelStep::new(tracker.clone())))
        .add_step(Arc::new(ApplyLowConfidenceLabelStep::new(
            tracker.clone(),
            options.low_confidence_label.clone(),
        )))
        .add_step(Arc::new(RequestReviewStep::new(
            tracker,
            options.review_comment.clone(),
        )))
        .set_entry(CLASSIFY)
        .add_conditional_edges(CLASSIFY, move |state| router.route(state))
        .with_schema(options.schema.clone())
        .with_execution_mode(options.execution)
        .compile()?;

    Ok(workflow)
}

/// Triage one issue
pub async fn process_issue(
    workflow: &Workflow,
    issue_id: u64,
    title: &str,
    body: &str,
) -> Result<IssueState, TriageError> {
    log::info!("Processing issue #{}", issue_id);
    workflow.run(IssueState::new(issue_id, title, body)).await
}
