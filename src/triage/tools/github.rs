// SPDX-License-Identifier: MIT

//! GitHub implementation of the action port

use async_trait::async_trait;
use octocrab::Octocrab;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::IssueTracker;
use crate::error::TriageError;

/// Adds labels and comments on one repository's issues
pub struct GitHubTracker {
    octocrab: Arc<Octocrab>,
    owner: String,
    repo: String,
    timeout: Duration,
}

impl GitHubTracker {
    pub fn new(octocrab: Arc<Octocrab>, owner: String, repo: String, timeout: Duration) -> Self {
        Self {
            octocrab,
            owner,
            repo,
            timeout,
        }
    }

    /// Build a tracker authenticated with a personal access token
    pub fn from_token(
        token: String,
        owner: String,
        repo: String,
        timeout: Duration,
    ) -> Result<Self, TriageError> {
        let octocrab = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| TriageError::config(format!("failed to build GitHub client: {}", e)))?;

        Ok(Self::new(Arc::new(octocrab), owner, repo, timeout))
    }

    /// Await a GitHub call under this tracker's timeout
    async fn call<T, F>(&self, action: &str, fut: F) -> Result<T, TriageError>
    where
        F: Future<Output = Result<T, octocrab::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                log::error!("GitHub API error during {}: {}", action, e);
                Err(TriageError::action_failed(action, e.to_string()))
            }
            Err(_) => Err(TriageError::action_failed(
                action,
                format!("timed out after {:?}", self.timeout),
            )),
        }
    }
}

#[async_trait]
impl IssueTracker for GitHubTracker {
    async fn add_label(&self, issue_id: u64, label: &str) -> Result<(), TriageError> {
        log::info!(
            "Adding label '{}' to {}/{}#{}",
            label,
            self.owner,
            self.repo,
            issue_id
        );

        let labels = [label.to_string()];
        let issues = self.octocrab.issues(&self.owner, &self.repo);
        self.call("add_label", issues.add_labels(issue_id, &labels))
            .await?;
        Ok(())
    }

    async fn post_comment(&self, issue_id: u64, body: &str) -> Result<(), TriageError> {
        log::info!(
            "Commenting on {}/{}#{}",
            self.owner,
            self.repo,
            issue_id
        );

        let issues = self.octocrab.issues(&self.owner, &self.repo);
        self.call("post_comment", issues.create_comment(issue_id, body))
            .await?;
        Ok(())
    }
}
