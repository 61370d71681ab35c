//! Branch-scoped worktree isolation for agents.
//!
//! - `Provisioner`: creates a worktree on a fresh branch and seeds its environment
//! - `TaskBinder`: copies task and plan documents into a worktree
//! - `MergeCoordinator`: guarded merge-back with worktree and branch cleanup
//! - `WorkspaceState`, `AgentStatus`: read-only state queries

mod binder;
mod merge;
mod provisioner;
mod state;

pub use binder::{Binding, TaskBinder};
pub use merge::{MergeCoordinator, MergeOutcome};
pub use provisioner::{ProvisionOutcome, Provisioner};
pub use state::{AgentStatus, Lockstep, WorkspaceState};
