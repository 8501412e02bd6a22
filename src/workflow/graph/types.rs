// SPDX-License-Identifier: MIT

//! Graph workflow type definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{TriageError, WorkflowError};
use crate::workflow::state::{IssueState, StateUpdate};

/// A named unit of work in the graph
#[async_trait]
pub trait Step: Send + Sync {
    /// Unique step name within a workflow
    fn name(&self) -> &str;

    /// Run against the current state, returning fields to merge (or nothing)
    async fn run(&self, state: &IssueState) -> Result<Option<StateUpdate>, TriageError>;
}

/// Routing callback for a conditional edge
pub type Router = Arc<dyn Fn(&IssueState) -> Result<Vec<String>, WorkflowError> + Send + Sync>;

/// Outgoing edge of a step
#[derive(Clone)]
pub enum Edge {
    /// Always continue with exactly one step
    Static(String),
    /// Destinations computed from the state after the step ran
    Conditional(Router),
}

impl Edge {
    /// Destinations of this edge for the given state
    pub fn targets(&self, state: &IssueState) -> Result<Vec<String>, WorkflowError> {
        match self {
            Edge::Static(to) => Ok(vec![to.clone()]),
            Edge::Conditional(router) => router(state),
        }
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Static(to) => f.debug_tuple("Static").field(to).finish(),
            Edge::Conditional(_) => f.write_str("Conditional(<router>)"),
        }
    }
}

/// How the steps of one superstep are executed
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One step after another; a failure stops the remaining siblings
    #[default]
    Sequential,
    /// All steps of the superstep at once, on the same snapshot
    Concurrent,
}
