use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::config::TaskConfig;
use crate::error::{PilotError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub task: PathBuf,
    /// `None` when the shared plan was missing.
    pub plan: Option<PathBuf>,
}

/// Copies a task file and the shared plan into a workspace.
/// Re-binding overwrites previous copies.
pub struct TaskBinder {
    task_dest: PathBuf,
    plan_dest: PathBuf,
}

impl TaskBinder {
    pub fn new(tasks: &TaskConfig) -> Self {
        Self {
            task_dest: PathBuf::from(&tasks.task_dest),
            plan_dest: PathBuf::from(&tasks.plan_dest),
        }
    }

    pub fn task_dest(&self) -> &Path {
        &self.task_dest
    }

    /// Fails with `TaskFileNotFound` before touching the workspace.
    pub async fn ensure_task(task_file: &Path) -> Result<()> {
        if fs::try_exists(task_file).await? {
            Ok(())
        } else {
            Err(PilotError::TaskFileNotFound {
                path: task_file.to_path_buf(),
            })
        }
    }

    pub async fn bind(&self, workspace: &Path, task_file: &Path, plan_file: &Path) -> Result<Binding> {
        Self::ensure_task(task_file).await?;

        let task = workspace.join(&self.task_dest);
        copy_into(task_file, &task).await?;
        debug!(from = %task_file.display(), to = %task.display(), "Bound task file");

        let plan = if fs::try_exists(plan_file).await? {
            let dest = workspace.join(&self.plan_dest);
            copy_into(plan_file, &dest).await?;
            debug!(from = %plan_file.display(), to = %dest.display(), "Bound plan");
            Some(dest)
        } else {
            warn!(path = %plan_file.display(), "Shared plan not found, skipping");
            None
        };

        Ok(Binding { task, plan })
    }
}

async fn copy_into(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::copy(src, dst).await?;
    Ok(())
}
