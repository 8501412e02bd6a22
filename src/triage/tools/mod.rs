// SPDX-License-Identifier: MIT

//! Action port: side effects against the issue tracker

pub mod github;

use async_trait::async_trait;

use crate::error::TriageError;

/// The two side effects triage performs on an issue
///
/// Both are additive. Retries and timeouts belong to the implementation.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Add `label` without touching existing labels
    async fn add_label(&self, issue_id: u64, label: &str) -> Result<(), TriageError>;

    /// Post a comment on the issue
    async fn post_comment(&self, issue_id: u64, body: &str) -> Result<(), TriageError>;
}

/// Tracker that only logs what it would do
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunTracker;

#[async_trait]
impl IssueTracker for DryRunTracker {
    async fn add_label(&self, issue_id: u64, label: &str) -> Result<(), TriageError> {
        log::info!("[dry-run] would add label '{}' to issue #{}", label, issue_id);
        Ok(())
    }

    async fn post_comment(&self, issue_id: u64, body: &str) -> Result<(), TriageError> {
        log::info!("[dry-run] would comment on issue #{}: {}", issue_id, body);
        Ok(())
    }
}
