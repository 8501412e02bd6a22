// SPDX-License-Identifier: MIT

//! Workflow builder - assembles steps and edges into a runnable workflow

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::executor::{Workflow, DEFAULT_MAX_STEPS};
use super::types::{Edge, ExecutionMode, Router, Step};
use crate::error::WorkflowError;
use crate::workflow::state::{IssueState, StateSchema};

/// Builder for [`Workflow`]
///
/// Nothing is validated until [`WorkflowBuilder::compile`].
pub struct WorkflowBuilder {
    name: String,
    entry: Option<String>,
    steps: Vec<Arc<dyn Step>>,
    edges: Vec<(String, Edge)>,
    schema: StateSchema,
    mode: ExecutionMode,
    max_steps: usize,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: None,
            steps: Vec::new(),
            edges: Vec::new(),
            schema: StateSchema::default(),
            mode: ExecutionMode::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn add_step(mut self, step: Arc<dyn Step>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn set_entry(mut self, step: impl Into<String>) -> Self {
        self.entry = Some(step.into());
        self
    }

    /// Unconditional edge `from -> to`
    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edges.push((from.into(), Edge::Static(to.into())));
        self
    }

    /// Edge whose destinations are computed by `router` after `from` ran
    pub fn add_conditional_edges<F>(mut self, from: impl Into<String>, router: F) -> Self
    where
        F: Fn(&IssueState) -> Result<Vec<String>, WorkflowError> + Send + Sync + 'static,
    {
        let router: Router = Arc::new(router);
        self.edges.push((from.into(), Edge::Conditional(router)));
        self
    }

    pub fn with_schema(mut self, schema: StateSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Validate the graph and produce a runnable workflow
    pub fn compile(self) -> Result<Workflow, WorkflowError> {
        let mut steps: HashMap<String, Arc<dyn Step>> = HashMap::new();
        for step in self.steps {
            let name = step.name().to_string();
            if steps.contains_key(&name) {
                return Err(WorkflowError::DuplicateStep(name));
            }
            steps.insert(name, step);
        }

        let entry = self.entry.ok_or(WorkflowError::MissingEntry)?;
        if !steps.contains_key(&entry) {
            return Err(WorkflowError::UnknownStep(entry));
        }

        let mut seen: HashSet<String> = HashSet::new();
        let mut edges: HashMap<String, Edge> = HashMap::new();
        for (from, edge) in self.edges {
            if !steps.contains_key(&from) {
                return Err(WorkflowError::UnknownStep(from));
            }
            if let Edge::Static(to) = &edge {
                if !steps.contains_key(to) {
                    return Err(WorkflowError::UnknownStep(to.clone()));
                }
            }
            if !seen.insert(from.clone()) {
                return Err(WorkflowError::DuplicateEdge(from));
            }
            edges.insert(from, edge);
        }

        Ok(Workflow::new(
            self.name,
            entry,
            steps,
            edges,
            self.schema,
            self.mode,
            self.max_steps,
        ))
    }
}
