use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::PilotConfig;
use crate::error::{PilotError, Result};
use crate::git::{GitRunner, RepoInspector};
use crate::registry::Agent;

#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub agent: Agent,
    pub branch: String,
    pub into: String,
    pub workspace: PathBuf,
    pub workspace_removed: bool,
}

/// Merges an agent branch into the integration branch, then removes the
/// worktree and branch together.
///
/// Every check runs before the primary checkout is touched, and the worktree
/// is only removed after the merge succeeded. A failed merge leaves both in place.
pub struct MergeCoordinator {
    repo_root: PathBuf,
    config: Arc<PilotConfig>,
}

impl MergeCoordinator {
    pub fn new(repo_root: impl Into<PathBuf>, config: Arc<PilotConfig>) -> Self {
        Self {
            repo_root: repo_root.into(),
            config,
        }
    }

    pub async fn merge(&self, agent: Agent) -> Result<MergeOutcome> {
        let prefix = &self.config.git.branch_prefix;
        let main = &self.config.git.main_branch;
        let branch = agent.branch_name(prefix);
        let workspace = agent.workspace_path(&self.repo_root, prefix);

        self.check_preconditions(&branch, &workspace)?;

        let git = GitRunner::new(&self.repo_root);
        git.checkout(main).await?;
        git.merge(
            &branch,
            &format!("Merge {} (agent {}, phase {})", branch, agent, agent.phase()),
        )
        .await?;
        info!(branch = %branch, into = %main, "Merged agent branch");

        let workspace_removed = if workspace.exists() {
            git.worktree_remove(&workspace).await?;
            info!(path = %workspace.display(), "Removed worktree");
            true
        } else {
            false
        };

        git.delete_merged_branch(&branch).await?;
        info!(branch = %branch, "Deleted branch");

        Ok(MergeOutcome {
            agent,
            branch,
            into: main.clone(),
            workspace,
            workspace_removed,
        })
    }

    /// The agent workspace is checked too: it is force-removed after the
    /// merge, so uncommitted edits to tracked files there would be lost.
    fn check_preconditions(&self, branch: &str, workspace: &Path) -> Result<()> {
        let repo = RepoInspector::open(&self.repo_root)?;

        if !repo.branch_exists(branch) {
            return Err(PilotError::BranchNotFound(branch.to_string()));
        }

        if !repo.tree_state()?.is_clean() {
            return Err(PilotError::UncommittedChanges {
                path: self.repo_root.clone(),
            });
        }

        if workspace.exists()
            && let Ok(agent_repo) = RepoInspector::open(workspace)
            && !agent_repo.tree_state()?.is_clean()
        {
            return Err(PilotError::UncommittedChanges {
                path: workspace.to_path_buf(),
            });
        }

        Ok(())
    }
}
