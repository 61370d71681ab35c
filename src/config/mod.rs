//! Configuration types and loading.
//!
//! - `PilotConfig`: process-wide settings, loaded once and passed explicitly
//! - `ProjectPaths`: repository root, config file and task locations

mod settings;

pub use settings::{
    ArtifactConfig, DisplayConfig, EnvironmentConfig, GitConfig, PilotConfig, ProjectPaths,
    TaskConfig,
};
