// SPDX-License-Identifier: MIT

//! Process configuration
//!
//! Values come from an optional YAML file and from the environment (after
//! `.env` is loaded by the binary). The environment wins.

use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use super::pipeline::TriageOptions;
use crate::error::TriageError;
use crate::model::openai::DEFAULT_BASE_URL;
use crate::workflow::graph::ExecutionMode;
use crate::workflow::routing::ConfidenceRouter;
use crate::workflow::state::StateSchema;

pub const DEFAULT_MODEL: &str = "gpt-4.1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optional YAML configuration file
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub threshold: Option<f64>,
    pub labels: Option<Vec<String>>,
    pub low_confidence_label: Option<String>,
    pub review_comment: Option<String>,
    pub model: Option<String>,
    pub execution: Option<ExecutionMode>,
    pub timeout_secs: Option<u64>,
    /// Merge strategy overrides, e.g. `confidence: max`
    pub state: Option<StateSchema>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, TriageError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    pub fn parse_yaml(content: &str) -> Result<Self, TriageError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Credentials and location of the GitHub repository
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubSettings {
    pub token: String,
    pub owner: String,
    pub repo: String,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub model: String,
    /// `None` only in dry-run mode
    pub github: Option<GitHubSettings>,
    pub timeout: Duration,
    pub triage: TriageOptions,
}

impl Settings {
    /// Resolve settings from the process environment and an optional file
    pub fn load(config_path: Option<&Path>, dry_run: bool) -> Result<Self, TriageError> {
        let file = match config_path {
            Some(path) => FileConfig::from_path(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| env::var(key).ok(), dry_run)
    }

    /// Resolve settings from a file config and a variable lookup
    ///
    /// Every missing required variable is reported in one error.
    pub fn resolve<F>(file: FileConfig, lookup: F, dry_run: bool) -> Result<Self, TriageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openai_api_key = var("OPENAI_API_KEY");
        let token = var("GH_TOKEN").or_else(|| var("GITHUB_TOKEN"));
        let owner = var("REPO_OWNER");
        let repo = var("REPO_NAME");

        let mut missing = Vec::new();
        if openai_api_key.is_none() {
            missing.push("OPENAI_API_KEY");
        }
        if !dry_run {
            if token.is_none() {
                missing.push("GH_TOKEN");
            }
            if owner.is_none() {
                missing.push("REPO_OWNER");
            }
            if repo.is_none() {
                missing.push("REPO_NAME");
            }
        }
        if !missing.is_empty() {
            return Err(TriageError::config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let github = match (token, owner, repo) {
            (Some(token), Some(owner), Some(repo)) if !dry_run => Some(GitHubSettings {
                token,
                owner,
                repo,
            }),
            _ => None,
        };

        let defaults = TriageOptions::default();

        let threshold = match var("CONF_THRESHOLD") {
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| {
                TriageError::config(format!("CONF_THRESHOLD is not a number: {}", raw))
            })?,
            None => file.threshold.unwrap_or(defaults.threshold),
        };
        ConfidenceRouter::new(threshold)?;

        let labels = match var("TRIAGE_LABELS") {
            Some(raw) => raw
                .split(',')
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            None => file.labels.unwrap_or(defaults.labels),
        };
        if labels.is_empty() {
            return Err(TriageError::config("at least one classification label is required"));
        }

        let execution = match var("TRIAGE_EXECUTION") {
            Some(raw) => parse_execution(&raw)?,
            None => file.execution.unwrap_or(defaults.execution),
        };

        let timeout_secs = match var("TRIAGE_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                TriageError::config(format!("TRIAGE_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(TriageError::config("timeout must be at least one second"));
        }

        Ok(Self {
            openai_api_key: openai_api_key.unwrap_or_default(),
            openai_base_url: var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: var("OPENAI_MODEL")
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            github,
            timeout: Duration::from_secs(timeout_secs),
            triage: TriageOptions {
                threshold,
                labels,
                low_confidence_label: var("LOW_CONFIDENCE_LABEL")
                    .or(file.low_confidence_label)
                    .unwrap_or(defaults.low_confidence_label),
                review_comment: file.review_comment.unwrap_or(defaults.review_comment),
                execution,
                schema: file.state.unwrap_or(defaults.schema),
            },
        })
    }
}

fn parse_execution(raw: &str) -> Result<ExecutionMode, TriageError> {
    match raw.trim().to_lowercase().as_str() {
        "sequential" => Ok(ExecutionMode::Sequential),
        "concurrent" => Ok(ExecutionMode::Concurrent),
        other => Err(TriageError::config(format!(
            "TRIAGE_EXECUTION must be 'sequential' or 'concurrent', got '{}'",
            other
        ))),
    }
}
