// SPDX-License-Identifier: MIT

pub mod error;
pub mod model;
pub mod triage;
pub mod workflow;
