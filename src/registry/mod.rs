//! Static agent and phase tables.
//!
//! - `Agent`: closed set of refactoring agents, each bound to one phase
//! - `Phase`: pipeline phases and their dependency partial order
//!
//! The tables are compile-time constants; adding an agent means a new build.

mod agent;
mod phase;

pub use agent::Agent;
pub use phase::{Phase, barrier_groups};
