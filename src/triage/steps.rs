// SPDX-License-Identifier: MIT

//! Triage steps: classification and the three terminal actions

use async_trait::async_trait;
use std::sync::Arc;

use super::classifier::Classifier;
use super::tools::IssueTracker;
use crate::error::{TriageError, WorkflowError};
use crate::workflow::graph::Step;
use crate::workflow::routing::{APPLY_LABEL, APPLY_LOW_CONFIDENCE_LABEL, REQUEST_REVIEW};
use crate::workflow::state::{IssueState, StateUpdate};

pub const CLASSIFY: &str = "classify";

/// Entry step: asks the classifier port for a label and confidence
pub struct ClassifyStep {
    classifier: Arc<dyn Classifier>,
    labels: Vec<String>,
}

impl ClassifyStep {
    /// `labels` is the recognized set, compared in lowercase
    pub fn new(classifier: Arc<dyn Classifier>, labels: &[String]) -> Self {
        Self {
            classifier,
            labels: labels.iter().map(|l| normalize_label(l)).collect(),
        }
    }
}

/// Canonical form of a label
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

#[async_trait]
impl Step for ClassifyStep {
    fn name(&self) -> &str {
        CLASSIFY
    }

    async fn run(&self, state: &IssueState) -> Result<Option<StateUpdate>, TriageError> {
        let result = self.classifier.classify(state.title(), state.body()).await?;

        let label = normalize_label(&result.label);
        if !self.labels.contains(&label) {
            return Err(TriageError::parse(format!(
                "unrecognized label '{}' (expected one of: {})",
                result.label,
                self.labels.join(", ")
            )));
        }

        if !result.confidence.is_finite() || !(0.0..=1.0).contains(&result.confidence) {
            return Err(TriageError::parse(format!(
                "confidence {} is outside [0, 1]",
                result.confidence
            )));
        }

        log::info!(
            "Issue #{} classified as '{}' (confidence {:.2})",
            state.issue_id(),
            label,
            result.confidence
        );

        Ok(Some(StateUpdate::classification(label, result.confidence)))
    }
}

/// Adds the classified label to the issue
pub struct ApplyLabelStep {
    tracker: Arc<dyn IssueTracker>,
}

impl ApplyLabelStep {
    pub fn new(tracker: Arc<dyn IssueTracker>) -> Self {
        Self { tracker }
    }
}

#[async_trait]
impl Step for ApplyLabelStep {
    fn name(&self) -> &str {
        APPLY_LABEL
    }

    async fn run(&self, state: &IssueState) -> Result<Option<StateUpdate>, TriageError> {
        let label = state
            .label()
            .ok_or_else(|| WorkflowError::MissingField("label".to_string()))?;
        self.tracker.add_label(state.issue_id(), label).await?;
        Ok(None)
    }
}

/// Adds the fixed low-confidence marker next to the classified label
pub struct ApplyLowConfidenceLabelStep {
    tracker: Arc<dyn IssueTracker>,
    marker: String,
}

impl ApplyLowConfidenceLabelStep {
    pub fn new(tracker: Arc<dyn IssueTracker>, marker: impl Into<String>) -> Self {
        Self {
            tracker,
            marker: marker.into(),
        }
    }
}

#[async_trait]
impl Step for ApplyLowConfidenceLabelStep {
    fn name(&self) -> &str {
        APPLY_LOW_CONFIDENCE_LABEL
    }

    async fn run(&self, state: &IssueState) -> Result<Option<StateUpdate>, TriageError> {
        self.tracker.add_label(state.issue_id(), &self.marker).await?;
        Ok(None)
    }
}

/// Posts the review notice
pub struct RequestReviewStep {
    tracker: Arc<dyn IssueTracker>,
    notice: String,
}

impl RequestReviewStep {
    pub fn new(tracker: Arc<dyn IssueTracker>, notice: impl Into<String>) -> Self {
        Self {
            tracker,
            notice: notice.into(),
        }
    }
}

#[async_trait]
impl Step for RequestReviewStep {
    fn name(&self) -> &str {
        REQUEST_REVIEW
    }

    async fn run(&self, state: &IssueState) -> Result<Option<StateUpdate>, TriageError> {
        self.tracker
            .post_comment(state.issue_id(), &self.notice)
            .await?;
        Ok(None)
    }
}
