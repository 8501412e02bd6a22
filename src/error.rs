// SPDX-License-Identifier: MIT

//! Typed error handling for triage-rs
//!
//! `TriageError` is what a run surfaces to its caller. Engine-level failures
//! live in `WorkflowError`, model transport failures in `ModelError`.

use thiserror::Error;

/// Top-level error type for triage-rs
#[derive(Debug, Error)]
pub enum TriageError {
    /// The classifier could not be reached or the provider rejected the call
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// The classifier answered, but not with a usable structured result
    #[error("Could not parse classification: {0}")]
    ClassificationParse(String),

    /// A side effect against the issue tracker failed
    #[error("Action '{action}' failed: {message}")]
    ActionFailed { action: String, message: String },

    /// Workflow-specific errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// Configuration errors (missing env vars, invalid values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Workflow engine errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No entry step was set before compiling
    #[error("Workflow has no entry step")]
    MissingEntry,

    /// An edge, entry point or router referenced a step that does not exist
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    /// Two steps were registered under the same name
    #[error("Duplicate step: {0}")]
    DuplicateStep(String),

    /// A step was given more than one outgoing edge
    #[error("Step '{0}' already has an outgoing edge")]
    DuplicateEdge(String),

    /// Routing was attempted before label and confidence were populated
    #[error("Cannot route: issue #{0} has not been classified")]
    Unclassified(u64),

    /// A step needed a state field that was never written
    #[error("Missing state field: {0}")]
    MissingField(String),

    /// A reducer was declared on a field that cannot use it
    #[error("Reducer '{reducer}' is not valid for field '{field}'")]
    InvalidReducer { field: String, reducer: String },

    /// The run executed more steps than its budget allows
    #[error("Step limit exceeded: {0}")]
    StepLimitExceeded(usize),
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// The provider answered with a non-success status
    #[error("API error from provider (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// HTTP transport errors, including timeouts
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl TriageError {
    /// Create an action failure
    pub fn action_failed(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ActionFailed {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a classification parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ClassificationParse(message.into())
    }
}

impl From<ModelError> for TriageError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidResponse(message) => Self::ClassificationParse(message),
            other => Self::ClassifierUnavailable(other.to_string()),
        }
    }
}
