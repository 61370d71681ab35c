use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{PilotError, Result};

pub struct GitRunner {
    working_dir: PathBuf,
}

impl GitRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub async fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(args = ?args, dir = %self.working_dir.display(), "Running git command");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(args = ?args, stderr = %stderr.trim(), "Git command failed");
        }

        Ok(output)
    }

    pub async fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PilotError::Git(git2::Error::from_str(stderr.trim())));
        }

        Ok(output)
    }

    pub async fn checkout(&self, branch: &str) -> Result<()> {
        self.run_checked(&["checkout", branch]).await?;
        Ok(())
    }

    pub async fn merge(&self, branch: &str, message: &str) -> Result<()> {
        self.run_checked(&["merge", "--no-ff", branch, "-m", message])
            .await?;
        Ok(())
    }

    /// Deletes a branch that has already been merged (`git branch -d`).
    pub async fn delete_merged_branch(&self, branch: &str) -> Result<()> {
        self.run_checked(&["branch", "-d", branch]).await?;
        Ok(())
    }

    /// Creates `branch` from `base` and checks it out into a new worktree at `path`.
    pub async fn worktree_add_new_branch(&self, path: &Path, branch: &str, base: &str) -> Result<()> {
        let path_str = path_arg(path)?;

        let output = self
            .run(&["worktree", "add", "-b", branch, path_str, base])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PilotError::Worktree {
                message: stderr.trim().to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }

    pub async fn worktree_remove(&self, path: &Path) -> Result<()> {
        let path_str = path_arg(path)?;

        let output = self
            .run(&["worktree", "remove", "--force", path_str])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PilotError::Worktree {
                message: stderr.trim().to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(())
    }
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| PilotError::Other(format!("Invalid path encoding: {}", path.display())))
}
