use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::git::{RepoInspector, TreeState};
use crate::registry::{Agent, Phase};

/// Workspace state recomputed from the filesystem on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum WorkspaceState {
    Absent,
    Present {
        /// Task file has been copied in.
        bound: bool,
        /// `None` when the directory is not a readable checkout.
        tree: Option<TreeState>,
    },
}

impl WorkspaceState {
    /// `bind_marker` is the task destination, relative to the workspace root.
    pub fn inspect(path: &Path, bind_marker: &Path) -> Self {
        if !path.exists() {
            return Self::Absent;
        }

        let bound = path.join(bind_marker).is_file();
        let tree = RepoInspector::open(path)
            .and_then(|repo| repo.tree_state())
            .ok();

        Self::Present { bound, tree }
    }

    pub fn exists(self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn is_clean(self) -> bool {
        matches!(
            self,
            Self::Present {
                tree: Some(TreeState::Clean),
                ..
            }
        )
    }

    pub fn label(self) -> String {
        match self {
            Self::Absent => "absent".to_string(),
            Self::Present { bound, tree } => {
                let stage = if bound { "bound" } else { "provisioned" };
                let tree = match tree {
                    Some(TreeState::Clean) => "clean".to_string(),
                    Some(TreeState::Dirty { entries }) => format!("dirty ({entries} changes)"),
                    None => "not a checkout".to_string(),
                };
                format!("{stage}, {tree}")
            }
        }
    }
}

/// Whether a branch and its workspace exist together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lockstep {
    InSync,
    BranchWithoutWorkspace,
    WorkspaceWithoutBranch,
}

impl Lockstep {
    pub fn from_existence(workspace: bool, branch: bool) -> Self {
        match (workspace, branch) {
            (true, false) => Self::WorkspaceWithoutBranch,
            (false, true) => Self::BranchWithoutWorkspace,
            _ => Self::InSync,
        }
    }

    pub fn is_diverged(self) -> bool {
        self != Self::InSync
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub agent: Agent,
    pub phase: Phase,
    pub branch: String,
    pub branch_exists: bool,
    pub workspace_path: PathBuf,
    pub workspace: WorkspaceState,
    pub lockstep: Lockstep,
}

impl AgentStatus {
    pub fn is_merge_ready(&self) -> bool {
        self.branch_exists && self.workspace.is_clean()
    }
}
