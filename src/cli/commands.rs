use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "refactor-pilot")]
#[command(author, version, about = "Worktree orchestrator for phased refactoring agents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Primary repository (default: discovered from the current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// Path to config.toml (default: <repo>/.claude/refactor/config.toml)
    #[arg(long, global = true, env = "REFACTOR_PILOT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List agents grouped by phase
    List,

    /// Provision a worktree for one agent and bind its task
    Launch {
        /// Agent name (see `list`)
        agent: String,
    },

    /// Launch every agent, phase group by phase group
    All,

    /// Show branch and worktree state for an agent
    Status {
        /// Agent name (see `list`)
        agent: String,
    },

    /// Merge an agent branch into main and remove its worktree
    Merge {
        /// Agent name (see `list`)
        agent: String,
    },
}
