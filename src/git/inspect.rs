use std::path::Path;

use git2::{BranchType, ErrorCode, Repository, StatusOptions};
use serde::Serialize;

use crate::error::{PilotError, Result};

/// Cleanliness of a working tree. Only staged and unstaged changes to
/// tracked files count; untracked and ignored files do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum TreeState {
    Clean,
    Dirty { entries: usize },
}

impl TreeState {
    pub fn is_clean(self) -> bool {
        self == Self::Clean
    }
}

pub struct RepoInspector {
    repo: Repository,
}

impl RepoInspector {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => PilotError::NotInGitRepo,
            _ => PilotError::Git(e),
        })?;
        Ok(Self { repo })
    }

    pub fn branch_exists(&self, branch: &str) -> bool {
        self.repo.find_branch(branch, BranchType::Local).is_ok()
    }

    pub fn tree_state(&self) -> Result<TreeState> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);

        let entries = self.repo.statuses(Some(&mut opts))?.len();

        Ok(if entries == 0 {
            TreeState::Clean
        } else {
            TreeState::Dirty { entries }
        })
    }
}
