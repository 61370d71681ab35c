use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{PilotError, Result};
use crate::registry::Agent;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub git: GitConfig,
    pub tasks: TaskConfig,
    pub artifacts: ArtifactConfig,
    pub environment: EnvironmentConfig,
    pub display: DisplayConfig,
}

impl PilotConfig {
    pub async fn load(config_path: &Path) -> Result<Self> {
        let config = if config_path.exists() {
            let content = fs::read_to_string(config_path).await?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.git.main_branch.trim().is_empty() {
            errors.push("git.main_branch must not be empty");
        }
        if self.git.branch_prefix.trim().is_empty() {
            errors.push("git.branch_prefix must not be empty");
        }
        if self.git.branch_prefix.chars().any(char::is_whitespace) {
            errors.push("git.branch_prefix must not contain whitespace");
        }

        if !is_workspace_relative(&self.tasks.task_dest) {
            errors.push("tasks.task_dest must be a relative path inside the workspace");
        }
        if !is_workspace_relative(&self.tasks.plan_dest) {
            errors.push("tasks.plan_dest must be a relative path inside the workspace");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(PilotError::Config(errors.join("; ")))
        }
    }
}

fn is_workspace_relative(path: &str) -> bool {
    let path = Path::new(path);
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Integration branch agents branch from and merge back into.
    pub main_branch: String,
    pub branch_prefix: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            main_branch: String::from("main"),
            branch_prefix: String::from("refactor"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Directory (relative to the repository root) holding `<agent>.md` task files.
    pub tasks_dir: String,
    /// Shared plan document, relative to the repository root.
    pub plan_file: String,
    /// Where the task file lands inside a workspace.
    pub task_dest: String,
    /// Where the plan lands inside a workspace.
    pub plan_dest: String,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            tasks_dir: String::from("refactor/tasks"),
            plan_file: String::from("refactor/PLAN.md"),
            task_dest: String::from("TASK.md"),
            plan_dest: String::from(".claude/plans/PLAN.md"),
        }
    }
}

/// Environment artifacts copied from the repository root into each new workspace.
/// Every copy is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
    /// Key material directories; every file inside is restricted to 0600.
    pub key_dirs: Vec<String>,
    /// Individual files restricted to 0600 after copy.
    pub secret_files: Vec<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            files: vec![String::from(".env"), String::from(".env.local")],
            dirs: vec![
                String::from(".vscode"),
                String::from(".idea"),
                String::from("data"),
            ],
            key_dirs: vec![String::from("keys"), String::from(".secrets")],
            secret_files: vec![String::from(".env"), String::from(".env.local")],
        }
    }
}

/// Commands that build the isolated runtime environment inside a workspace.
/// An empty command skips that step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub create: Vec<String>,
    pub install: Vec<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            create: vec![String::from("uv"), String::from("venv")],
            install: vec![String::from("uv"), String::from("sync")],
        }
    }
}

impl EnvironmentConfig {
    pub fn disabled() -> Self {
        Self {
            create: Vec::new(),
            install: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Filesystem locations resolved once at startup.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub tasks_dir: PathBuf,
    pub plan_file: PathBuf,
}

impl ProjectPaths {
    pub const CONFIG_FILE: &'static str = ".claude/refactor/config.toml";

    /// Resolves the primary repository root from any path inside it.
    pub fn discover(start: &Path) -> Result<PathBuf> {
        let repo = git2::Repository::discover(start).map_err(|_| PilotError::NotInGitRepo)?;
        let workdir = repo.workdir().ok_or(PilotError::NotInGitRepo)?;
        Ok(workdir.canonicalize()?)
    }

    pub fn default_config_file(root: &Path) -> PathBuf {
        root.join(Self::CONFIG_FILE)
    }

    pub fn new(root: PathBuf, config: &PilotConfig) -> Self {
        Self {
            tasks_dir: root.join(&config.tasks.tasks_dir),
            plan_file: root.join(&config.tasks.plan_file),
            root,
        }
    }

    pub fn task_file(&self, agent: Agent) -> PathBuf {
        self.tasks_dir.join(format!("{}.md", agent.name()))
    }
}
