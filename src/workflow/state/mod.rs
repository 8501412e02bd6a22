// SPDX-License-Identifier: MIT

//! State management for the triage workflow
//!
//! This module provides:
//! - `StateSchema` - the per-field merge strategy table
//! - `IssueState` - the record threaded through a run
//! - `StateUpdate` - the partial update a step returns

mod schema;
mod store;

pub use schema::{ReducerType, StateField, StateSchema};
pub use store::{IssueState, StateUpdate};
