// SPDX-License-Identifier: MIT

//! Classifier port and its LLM-backed implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::error::TriageError;
use crate::model::{Content, GenerationConfig, Model};

/// Structured classifier answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

/// Produces a label and a confidence for an issue
///
/// Implementations enforce their own call timeouts.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, title: &str, body: &str) -> Result<Classification, TriageError>;
}

/// Classifier that asks a chat model for a JSON verdict
pub struct LlmClassifier {
    model: Arc<dyn Model>,
    labels: Vec<String>,
    config: GenerationConfig,
}

impl LlmClassifier {
    pub fn new(model: Arc<dyn Model>, labels: Vec<String>) -> Self {
        Self {
            model,
            labels,
            config: GenerationConfig {
                temperature: Some(0.0),
                ..Default::default()
            },
        }
    }

    /// System instruction listing the closed label set
    fn instruction(&self) -> String {
        format!(
            "You are an experienced software maintainer triaging GitHub issues. \
             Classify the issue as exactly one of: {}. \
             Answer with a single JSON object with the keys \"classification\" \
             (one of the categories above) and \"confidence\" (a number between 0 and 1).",
            self.labels.join(", ")
        )
    }

    fn user_prompt(title: &str, body: &str) -> String {
        format!("Issue title: {}\n\nIssue body: {}", title, body)
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, title: &str, body: &str) -> Result<Classification, TriageError> {
        let history = vec![
            Content::text("system", self.instruction()),
            Content::text("user", Self::user_prompt(title, body)),
        ];

        let response = self
            .model
            .generate_content(&history, Some(&self.config))
            .await?;

        match response.first_text() {
            Some(text) => parse_classification(text),
            None => match response.refusal() {
                Some(refusal) => Err(TriageError::parse(format!("model refused: {}", refusal))),
                None => Err(TriageError::parse("model returned no text")),
            },
        }
    }
}

/// Extract `{"classification": .., "confidence": ..}` from free-form model text
///
/// The object may be wrapped in prose or a code fence; the span from the
/// first `{` to the last `}` is parsed. `confidence` may be a number or a
/// numeric string.
pub fn parse_classification(text: &str) -> Result<Classification, TriageError> {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => {
            return Err(TriageError::parse(format!(
                "response did not contain JSON: {}",
                text
            )))
        }
    };

    let value: Value = serde_json::from_str(span)
        .map_err(|e| TriageError::parse(format!("invalid JSON ({}): {}", e, span)))?;

    let label = value
        .get("classification")
        .and_then(Value::as_str)
        .ok_or_else(|| TriageError::parse(format!("missing 'classification' in {}", span)))?;

    let confidence = match value.get("confidence") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| TriageError::parse(format!("missing or non-numeric 'confidence' in {}", span)))?;

    Ok(Classification {
        label: label.to_string(),
        confidence,
    })
}
