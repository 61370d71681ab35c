pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod isolation;
pub mod orchestrator;
pub mod registry;
pub mod utils;

pub use config::{PilotConfig, ProjectPaths};
pub use error::{PilotError, Result};
pub use git::{GitRunner, RepoInspector};
pub use isolation::{AgentStatus, MergeCoordinator, Provisioner, TaskBinder, WorkspaceState};
pub use orchestrator::{LaunchOutcome, LifecycleController, PhaseScheduler, ScheduleReport};
pub use registry::{Agent, Phase};
