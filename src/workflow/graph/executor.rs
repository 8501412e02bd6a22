// SPDX-License-Identifier: MIT

//! Graph workflow executor

use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::types::{Edge, ExecutionMode, Step};
use crate::error::{TriageError, WorkflowError};
use crate::workflow::state::{IssueState, StateSchema, StateUpdate};

/// Safety limit on executed steps per run
pub const DEFAULT_MAX_STEPS: usize = 100;

/// Compiled graph of named steps
pub struct Workflow {
    name: String,
    entry: String,
    steps: HashMap<String, Arc<dyn Step>>,
    edges: HashMap<String, Edge>,
    schema: StateSchema,
    mode: ExecutionMode,
    max_steps: usize,
}

impl Workflow {
    pub(super) fn new(
        name: String,
        entry: String,
        steps: HashMap<String, Arc<dyn Step>>,
        edges: HashMap<String, Edge>,
        schema: StateSchema,
        mode: ExecutionMode,
        max_steps: usize,
    ) -> Self {
        Self {
            name,
            entry,
            steps,
            edges,
            schema,
            mode,
            max_steps,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the graph from the entry step until no step is reachable
    ///
    /// Each superstep runs its steps against a snapshot of the state taken
    /// before the superstep; updates are merged afterwards and routing sees
    /// the merged state. The first failing step aborts the run.
    pub async fn run(&self, initial: IssueState) -> Result<IssueState, TriageError> {
        let run_id = Uuid::new_v4();
        let mut state = initial;
        let mut frontier = vec![self.entry.clone()];
        let mut executed = 0usize;
        let mut superstep = 0usize;

        log::info!(
            "[run {}] starting workflow {} for issue #{}",
            run_id,
            self.name,
            state.issue_id()
        );

        while !frontier.is_empty() {
            superstep += 1;
            executed += frontier.len();
            if executed > self.max_steps {
                log::error!("[run {}] step limit of {} exceeded", run_id, self.max_steps);
                return Err(WorkflowError::StepLimitExceeded(self.max_steps).into());
            }

            log::info!(
                "[run {}] superstep {}: executing {} steps: {:?}",
                run_id,
                superstep,
                frontier.len(),
                frontier
            );

            let snapshot = state.clone();
            let updates = self.execute_superstep(run_id, &frontier, &snapshot).await?;
            for update in updates.into_iter().flatten() {
                state.apply(update, &self.schema);
            }

            frontier = self.next_frontier(&frontier, &state)?;
        }

        log::info!(
            "[run {}] workflow {} completed after {} steps",
            run_id,
            self.name,
            executed
        );

        Ok(state)
    }

    async fn execute_superstep(
        &self,
        run_id: Uuid,
        frontier: &[String],
        snapshot: &IssueState,
    ) -> Result<Vec<Option<StateUpdate>>, TriageError> {
        match self.mode {
            ExecutionMode::Sequential => {
                let mut updates = Vec::with_capacity(frontier.len());
                for step_id in frontier {
                    updates.push(self.execute_step(run_id, step_id, snapshot).await?);
                }
                Ok(updates)
            }
            ExecutionMode::Concurrent => {
                try_join_all(
                    frontier
                        .iter()
                        .map(|step_id| self.execute_step(run_id, step_id, snapshot)),
                )
                .await
            }
        }
    }

    async fn execute_step(
        &self,
        run_id: Uuid,
        step_id: &str,
        state: &IssueState,
    ) -> Result<Option<StateUpdate>, TriageError> {
        let step = self
            .steps
            .get(step_id)
            .ok_or_else(|| WorkflowError::UnknownStep(step_id.to_string()))?;

        log::info!("[run {}] executing step: {}", run_id, step_id);
        match step.run(state).await {
            Ok(update) => {
                log::info!("[run {}] step {} completed", run_id, step_id);
                Ok(update)
            }
            Err(e) => {
                log::error!("[run {}] step {} failed: {}", run_id, step_id, e);
                Err(e)
            }
        }
    }

    /// Successors of every step in the frontier, in frontier order
    fn next_frontier(
        &self,
        frontier: &[String],
        state: &IssueState,
    ) -> Result<Vec<String>, WorkflowError> {
        let mut next = Vec::new();
        for step_id in frontier {
            let Some(edge) = self.edges.get(step_id) else {
                continue; // terminal
            };
            for target in edge.targets(state)? {
                if !self.steps.contains_key(&target) {
                    return Err(WorkflowError::UnknownStep(target));
                }
                next.push(target);
            }
        }
        Ok(next)
    }
}
