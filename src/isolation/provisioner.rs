use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ArtifactConfig, PilotConfig};
use crate::error::{PilotError, Result};
use crate::git::{GitRunner, RepoInspector};
use crate::registry::Agent;
use crate::utils::{CopyOutcome, copy_best_effort, restrict_to_owner};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created(PathBuf),
    /// The workspace directory was already there; nothing was touched.
    Skipped(PathBuf),
}

/// Creates branch-scoped worktrees and seeds them with local environment artifacts.
///
/// Dependency installation failure leaves the worktree partially provisioned;
/// it is not rolled back.
///
/// `git worktree add` writes shared administrative files under `.git/worktrees`,
/// so concurrent additions against one repository are serialized. Seeding and
/// environment setup run outside the lock.
pub struct Provisioner {
    repo_root: PathBuf,
    config: Arc<PilotConfig>,
    worktree_lock: Mutex<()>,
}

impl Provisioner {
    pub fn new(repo_root: impl Into<PathBuf>, config: Arc<PilotConfig>) -> Self {
        Self {
            repo_root: repo_root.into(),
            config,
            worktree_lock: Mutex::new(()),
        }
    }

    pub fn workspace_path(&self, agent: Agent) -> PathBuf {
        agent.workspace_path(&self.repo_root, &self.config.git.branch_prefix)
    }

    pub async fn provision(&self, agent: Agent) -> Result<ProvisionOutcome> {
        let path = self.workspace_path(agent);
        let branch = agent.branch_name(&self.config.git.branch_prefix);

        if path.exists() {
            warn!(agent = %agent, path = %path.display(), "Workspace already exists, skipping");
            return Ok(ProvisionOutcome::Skipped(path));
        }

        {
            let _guard = self.worktree_lock.lock().await;

            if RepoInspector::open(&self.repo_root)?.branch_exists(&branch) {
                return Err(PilotError::BranchExists(branch));
            }

            GitRunner::new(&self.repo_root)
                .worktree_add_new_branch(&path, &branch, &self.config.git.main_branch)
                .await?;
        }
        info!(agent = %agent, branch = %branch, path = %path.display(), "Created worktree");

        let root = self.repo_root.clone();
        let dest = path.clone();
        let artifacts = self.config.artifacts.clone();
        tokio::task::spawn_blocking(move || seed_artifacts(&root, &dest, &artifacts))
            .await
            .map_err(|e| PilotError::Other(format!("artifact copy panicked: {}", e)))??;

        self.prepare_environment(&path).await?;

        Ok(ProvisionOutcome::Created(path))
    }

    async fn prepare_environment(&self, workspace: &Path) -> Result<()> {
        let env = &self.config.environment;
        for command in [&env.create, &env.install] {
            if let Some((program, args)) = command.split_first() {
                run_in(workspace, program, args).await?;
            }
        }
        Ok(())
    }
}

fn seed_artifacts(root: &Path, workspace: &Path, artifacts: &ArtifactConfig) -> Result<()> {
    let sources: BTreeSet<&String> = artifacts
        .files
        .iter()
        .chain(&artifacts.secret_files)
        .chain(&artifacts.dirs)
        .chain(&artifacts.key_dirs)
        .collect();

    for rel in sources {
        match copy_best_effort(&root.join(rel), &workspace.join(rel))? {
            CopyOutcome::Copied { files } => debug!(artifact = %rel, files, "Copied artifact"),
            CopyOutcome::SourceMissing => warn!(artifact = %rel, "Artifact not found, skipping"),
        }
    }

    for rel in artifacts.secret_files.iter().chain(&artifacts.key_dirs) {
        let restricted = restrict_to_owner(&workspace.join(rel))?;
        if restricted > 0 {
            debug!(artifact = %rel, files = restricted, "Restricted permissions to 0600");
        }
    }

    Ok(())
}

async fn run_in(dir: &Path, program: &str, args: &[String]) -> Result<()> {
    info!(program, args = ?args, dir = %dir.display(), "Preparing environment");

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| PilotError::CommandFailed {
            program: program.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PilotError::CommandFailed {
            program: program.to_string(),
            message: stderr.trim().to_string(),
        });
    }

    Ok(())
}
