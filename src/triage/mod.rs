// SPDX-License-Identifier: MIT

//! Issue triage: ports, steps and the assembled workflow
//!
//! - `classifier` - the classifier port and its LLM implementation
//! - `tools` - the action port (GitHub, dry-run)
//! - `steps` / `pipeline` - the triage graph
//! - `config` / `trigger` - settings and event filtering for the binary

pub mod classifier;
pub mod config;
pub mod pipeline;
pub mod steps;
pub mod tools;
pub mod trigger;

pub use classifier::{Classification, Classifier, LlmClassifier};
pub use pipeline::{build_workflow, process_issue, TriageOptions};
pub use tools::{DryRunTracker, IssueTracker};
