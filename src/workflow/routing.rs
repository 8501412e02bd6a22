// SPDX-License-Identifier: MIT

//! Confidence-threshold routing
//!
//! Decides which action steps follow classification. A confident result only
//! gets its label; an unsure one keeps its label and is additionally marked
//! and sent for human review.

use crate::error::{TriageError, WorkflowError};
use crate::workflow::state::IssueState;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;

pub const APPLY_LABEL: &str = "apply_label";
pub const APPLY_LOW_CONFIDENCE_LABEL: &str = "apply_low_confidence_label";
pub const REQUEST_REVIEW: &str = "request_review";

/// Routes on classifier confidence against a fixed threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceRouter {
    threshold: f64,
}

impl ConfidenceRouter {
    pub fn new(threshold: f64) -> Result<Self, TriageError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(TriageError::config(format!(
                "confidence threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    /// Next steps for a classified state
    ///
    /// `confidence == threshold` counts as confident.
    pub fn route(&self, state: &IssueState) -> Result<Vec<String>, WorkflowError> {
        let (_, confidence) = state
            .classification()
            .ok_or(WorkflowError::Unclassified(state.issue_id()))?;

        if confidence >= self.threshold {
            return Ok(vec![APPLY_LABEL.to_string()]);
        }

        Ok(vec![
            APPLY_LABEL.to_string(),
            APPLY_LOW_CONFIDENCE_LABEL.to_string(),
            REQUEST_REVIEW.to_string(),
        ])
    }
}

impl Default for ConfidenceRouter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}
