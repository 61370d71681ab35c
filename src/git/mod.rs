//! Version-control access.
//!
//! - `GitRunner`: mutating operations through the `git` CLI (worktree, merge, branch)
//! - `RepoInspector`: read-only queries through libgit2 (branches, tree cleanliness)

mod inspect;
mod runner;

pub use inspect::{RepoInspector, TreeState};
pub use runner::GitRunner;
