//! Agent lifecycle and bulk scheduling.
//!
//! - `LifecycleController`: `launch`, `status` and `merge` for a single agent
//! - `PhaseScheduler`: launches all agents in barrier-synchronized phase groups

mod lifecycle;
mod scheduler;

pub use lifecycle::{LaunchOutcome, LifecycleController};
pub use scheduler::{AgentLauncher, AgentRun, GroupReport, PhaseScheduler, ScheduleReport};
