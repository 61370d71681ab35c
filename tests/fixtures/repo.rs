//! Throwaway git repositories for lifecycle tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;

use refactor_pilot::config::{EnvironmentConfig, PilotConfig, ProjectPaths};
use refactor_pilot::orchestrator::LifecycleController;
use refactor_pilot::registry::Agent;

/// A primary repository at `<tmp>/trader` on branch `main`, with one commit.
/// Worktrees land next to it inside the same temp dir.
pub struct TestRepo {
    pub dir: TempDir,
    pub root: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = dir.path().join("trader");
        fs::create_dir_all(&root).unwrap();

        git(&root, &["init", "-q", "-b", "main"]);
        git(&root, &["config", "user.name", "Fixture"]);
        git(&root, &["config", "user.email", "fixture@example.com"]);
        git(&root, &["config", "commit.gpgsign", "false"]);

        fs::write(root.join("README.md"), "# trader\n").unwrap();
        fs::write(root.join(".gitignore"), ".env\nkeys/\n").unwrap();
        git(&root, &["add", "-A"]);
        git(&root, &["commit", "-q", "-m", "initial"]);

        let root = root.canonicalize().unwrap();
        Self { dir, root }
    }

    pub fn config() -> PilotConfig {
        PilotConfig {
            environment: EnvironmentConfig::disabled(),
            ..PilotConfig::default()
        }
    }

    pub fn controller(&self) -> LifecycleController {
        self.controller_with(Self::config())
    }

    pub fn controller_with(&self, config: PilotConfig) -> LifecycleController {
        let paths = ProjectPaths::new(self.root.clone(), &config);
        LifecycleController::new(Arc::new(config), paths)
    }

    /// Writes the task file `refactor/tasks/<agent>.md` (untracked files are
    /// committed so the primary tree stays clean).
    pub fn add_task(&self, agent: Agent, body: &str) -> PathBuf {
        let path = self
            .root
            .join("refactor/tasks")
            .join(format!("{}.md", agent.name()));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        self.commit_all(&format!("task for {}", agent));
        path
    }

    pub fn add_all_tasks(&self) {
        for agent in Agent::ALL {
            let path = self
                .root
                .join("refactor/tasks")
                .join(format!("{}.md", agent.name()));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("task for {}\n", agent)).unwrap();
        }
        self.commit_all("all tasks");
    }

    pub fn add_plan(&self, body: &str) {
        let path = self.root.join("refactor/PLAN.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
        self.commit_all("plan");
    }

    pub fn commit_all(&self, message: &str) {
        commit_all(&self.root, message);
    }

    pub fn workspace(&self, agent: Agent) -> PathBuf {
        agent.workspace_path(&self.root, "refactor")
    }

    pub fn branch_exists(&self, branch: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
            .current_dir(&self.root)
            .status()
            .unwrap()
            .success()
    }

    pub fn current_branch(&self) -> String {
        git_output(&self.root, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn worktree_count(&self) -> usize {
        git_output(&self.root, &["worktree", "list", "--porcelain"])
            .lines()
            .filter(|l| l.starts_with("worktree "))
            .count()
    }
}

pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git is installed");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn git_output(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git is installed");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn commit_all(dir: &Path, message: &str) {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", message]);
}
