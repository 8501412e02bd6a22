// SPDX-License-Identifier: MIT

//! Model module - defines the LLM model trait and implementations
//!
//! This module provides the core Model trait and shared message types.
//! Implementations live in their own submodules:
//! - [openai] - OpenAI's chat completions API

pub mod openai;

use crate::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Parts of a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// The model declined to answer
    Refusal(String),
}

impl Content {
    /// Build a single-part text message
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// First non-empty text part, if any
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            Part::Text(t) if !t.trim().is_empty() => Some(t.as_str()),
            _ => None,
        })
    }

    /// First refusal part, if any
    pub fn refusal(&self) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            Part::Refusal(r) => Some(r.as_str()),
            _ => None,
        })
    }
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
    ) -> Result<Content, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_text_skips_blank_parts() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![Part::Text("  ".to_string()), Part::Text("hello".to_string())],
        };
        assert_eq!(content.first_text(), Some("hello"));
    }

    #[test]
    fn test_refusal_is_not_text() {
        let content = Content {
            role: "model".to_string(),
            parts: vec![Part::Refusal("no".to_string())],
        };
        assert_eq!(content.first_text(), None);
        assert_eq!(content.refusal(), Some("no"));
    }
}
