// SPDX-License-Identifier: MIT

//! Graph-based workflow execution
//!
//! A workflow is a set of named steps joined by static or conditional edges.
//! The executor starts at the entry step and follows edges until no step is
//! reachable.

mod builder;
pub mod executor;
pub mod types;

pub use builder::WorkflowBuilder;
pub use executor::{Workflow, DEFAULT_MAX_STEPS};
pub use types::{Edge, ExecutionMode, Router, Step};
