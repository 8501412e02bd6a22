// SPDX-License-Identifier: MIT

//! Runtime state storage for a triage run

use serde::Serialize;
use serde_json::Value;

use super::schema::{StateField, StateSchema};

/// The record threaded through one run
///
/// Issue identity and content are fixed at construction. `label` and
/// `confidence` only change through [`IssueState::apply`].
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IssueState {
    issue_id: u64,
    title: String,
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
}

/// Partial update returned by a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub label: Option<String>,
    pub confidence: Option<f64>,
}

impl StateUpdate {
    /// Label and confidence written together
    pub fn classification(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: Some(label.into()),
            confidence: Some(confidence),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.confidence.is_none()
    }
}

impl IssueState {
    pub fn new(issue_id: u64, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            issue_id,
            title: title.into(),
            body: body.into(),
            label: None,
            confidence: None,
        }
    }

    pub fn issue_id(&self) -> u64 {
        self.issue_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    /// Label and confidence, only once both have been written
    pub fn classification(&self) -> Option<(&str, f64)> {
        match (&self.label, self.confidence) {
            (Some(label), Some(confidence)) => Some((label.as_str(), confidence)),
            _ => None,
        }
    }

    /// Merge a step's update using the schema's reducer for each field
    pub fn apply(&mut self, update: StateUpdate, schema: &StateSchema) {
        if let Some(label) = update.label {
            // Only overwrite is accepted for label by the schema.
            self.label = Some(label);
        }

        if let Some(new) = update.confidence {
            let reducer = schema.reducer(StateField::Confidence);
            self.confidence = Some(reducer.reduce(self.confidence, new));
        }
    }

    /// Convert state to JSON object
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
