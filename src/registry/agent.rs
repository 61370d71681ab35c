use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use super::Phase;
use crate::error::PilotError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Agent {
    IbkrSplitter,
    StrategySimplify,
    CliExtractor,
    ConfigUnifier,
    OauthConsolidator,
    StorageLayer,
    TestHardening,
    IntegrationReview,
}

impl Agent {
    pub const ALL: [Agent; 8] = [
        Agent::IbkrSplitter,
        Agent::StrategySimplify,
        Agent::CliExtractor,
        Agent::ConfigUnifier,
        Agent::OauthConsolidator,
        Agent::StorageLayer,
        Agent::TestHardening,
        Agent::IntegrationReview,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::IbkrSplitter => "ibkr-splitter",
            Self::StrategySimplify => "strategy-simplify",
            Self::CliExtractor => "cli-extractor",
            Self::ConfigUnifier => "config-unifier",
            Self::OauthConsolidator => "oauth-consolidator",
            Self::StorageLayer => "storage-layer",
            Self::TestHardening => "test-hardening",
            Self::IntegrationReview => "integration-review",
        }
    }

    pub fn phase(self) -> Phase {
        match self {
            Self::IbkrSplitter => Phase::P1_1,
            Self::StrategySimplify => Phase::P1_2,
            Self::CliExtractor => Phase::P1_3,
            Self::ConfigUnifier => Phase::P2,
            Self::OauthConsolidator => Phase::P3,
            Self::StorageLayer => Phase::P4,
            Self::TestHardening => Phase::P5,
            Self::IntegrationReview => Phase::P6,
        }
    }

    /// `<prefix>/<agent>-<phase>`, e.g. `refactor/ibkr-splitter-1.1`.
    pub fn branch_name(self, prefix: &str) -> String {
        format!("{}/{}-{}", prefix, self.name(), self.phase())
    }

    /// Sibling of the repository root named `<repo>-<branch with '/' flattened>`.
    pub fn workspace_path(self, repo_root: &Path, prefix: &str) -> PathBuf {
        let repo_name = repo_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repo".to_string());
        let dir_name = format!(
            "{}-{}",
            repo_name,
            self.branch_name(prefix).replace(['/', '\\'], "-")
        );

        match repo_root.parent() {
            Some(parent) => parent.join(dir_name),
            None => PathBuf::from(dir_name),
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Agent {
    type Err = PilotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| PilotError::UnknownAgent(s.to_string()))
    }
}
