// SPDX-License-Identifier: MIT

pub mod graph;
pub mod routing;
pub mod state;
