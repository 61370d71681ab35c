//! Per-agent lifecycle: launch, status and merge.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use super::scheduler::AgentLauncher;
use crate::config::{PilotConfig, ProjectPaths};
use crate::error::Result;
use crate::git::RepoInspector;
use crate::isolation::{
    AgentStatus, Binding, Lockstep, MergeCoordinator, MergeOutcome, ProvisionOutcome, Provisioner,
    TaskBinder, WorkspaceState,
};
use crate::registry::Agent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum LaunchOutcome {
    Launched {
        path: PathBuf,
        branch: String,
        task: PathBuf,
        plan: Option<PathBuf>,
    },
    /// Workspace was already provisioned; nothing was changed.
    AlreadyExists { path: PathBuf },
}

impl LaunchOutcome {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Launched { path, .. } | Self::AlreadyExists { path } => path,
        }
    }
}

#[derive(Clone)]
pub struct LifecycleController {
    inner: Arc<Inner>,
}

struct Inner {
    config: Arc<PilotConfig>,
    paths: ProjectPaths,
    provisioner: Provisioner,
    binder: TaskBinder,
    merger: MergeCoordinator,
}

impl LifecycleController {
    pub fn new(config: Arc<PilotConfig>, paths: ProjectPaths) -> Self {
        let provisioner = Provisioner::new(&paths.root, Arc::clone(&config));
        let merger = MergeCoordinator::new(&paths.root, Arc::clone(&config));
        let binder = TaskBinder::new(&config.tasks);

        Self {
            inner: Arc::new(Inner {
                config,
                paths,
                provisioner,
                binder,
                merger,
            }),
        }
    }

    pub fn branch_name(&self, agent: Agent) -> String {
        agent.branch_name(&self.inner.config.git.branch_prefix)
    }

    pub fn workspace_path(&self, agent: Agent) -> PathBuf {
        self.inner.provisioner.workspace_path(agent)
    }

    /// Provisions and binds the agent's workspace.
    ///
    /// The task file is checked first so a missing task never leaves an
    /// empty workspace behind. An existing workspace is reported, not rebuilt.
    pub async fn launch(&self, agent: Agent) -> Result<LaunchOutcome> {
        let inner = &self.inner;
        let task_file = inner.paths.task_file(agent);

        TaskBinder::ensure_task(&task_file).await?;

        let path = self.workspace_path(agent);
        if path.exists() {
            warn!(agent = %agent, path = %path.display(), "Workspace already exists");
            return Ok(LaunchOutcome::AlreadyExists { path });
        }

        let path = match inner.provisioner.provision(agent).await? {
            ProvisionOutcome::Created(path) => path,
            ProvisionOutcome::Skipped(path) => return Ok(LaunchOutcome::AlreadyExists { path }),
        };

        let Binding { task, plan } = inner
            .binder
            .bind(&path, &task_file, &inner.paths.plan_file)
            .await?;

        info!(agent = %agent, phase = %agent.phase(), path = %path.display(), "Agent launched");

        Ok(LaunchOutcome::Launched {
            path,
            branch: self.branch_name(agent),
            task,
            plan,
        })
    }

    /// Read-only inspection of branch and workspace state.
    pub fn status(&self, agent: Agent) -> Result<AgentStatus> {
        let branch = self.branch_name(agent);
        let workspace_path = self.workspace_path(agent);

        let branch_exists = RepoInspector::open(&self.inner.paths.root)?.branch_exists(&branch);
        let workspace = WorkspaceState::inspect(&workspace_path, self.inner.binder.task_dest());
        let lockstep = Lockstep::from_existence(workspace.exists(), branch_exists);
        if lockstep.is_diverged() {
            warn!(agent = %agent, branch = %branch, lockstep = ?lockstep, "Branch and worktree out of lockstep");
        }

        Ok(AgentStatus {
            agent,
            phase: agent.phase(),
            branch,
            branch_exists,
            workspace_path,
            workspace,
            lockstep,
        })
    }

    pub async fn merge(&self, agent: Agent) -> Result<MergeOutcome> {
        self.inner.merger.merge(agent).await
    }
}

#[async_trait]
impl AgentLauncher for LifecycleController {
    async fn launch(&self, agent: Agent) -> Result<LaunchOutcome> {
        LifecycleController::launch(self, agent).await
    }
}
