// SPDX-License-Identifier: MIT

//! Run trigger: decides which GitHub `issues` events start a triage run

use serde::Deserialize;

use crate::workflow::state::IssueState;

const TRIAGED_ACTIONS: [&str; 3] = ["opened", "edited", "reopened"];

/// The subset of a GitHub `issues` webhook payload triage needs
#[derive(Debug, Clone, Deserialize)]
pub struct IssueEvent {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub issue: Option<IssuePayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePayload {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl IssueEvent {
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }

    /// Initial state for a run, or `None` when the event should be ignored
    ///
    /// Only opened, edited or reopened issues that are still open are triaged.
    pub fn into_initial_state(self) -> Option<IssueState> {
        let action = self.action.as_deref().unwrap_or_default();
        let issue = self.issue?;

        if !TRIAGED_ACTIONS.contains(&action) || issue.state.as_deref() != Some("open") {
            log::info!(
                "Ignoring event action={} state={:?}",
                action,
                issue.state
            );
            return None;
        }

        Some(IssueState::new(
            issue.number,
            issue.title.unwrap_or_default(),
            issue.body.unwrap_or_default(),
        ))
    }
}
