use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Task file not found: {}", path.display())]
    TaskFileNotFound { path: PathBuf },

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Branch already exists: {0} (workspace missing; remove the branch or restore the worktree)")]
    BranchExists(String),

    #[error("Uncommitted changes in {}. Commit or stash them first.", path.display())]
    UncommittedChanges { path: PathBuf },

    #[error("Worktree error: {message}")]
    Worktree { message: String, path: PathBuf },

    #[error("{program} failed: {message}")]
    CommandFailed { program: String, message: String },

    #[error("Phase group [{phases}] failed for: {}", failed.join(", "))]
    BarrierFailed { phases: String, failed: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, PilotError>;
