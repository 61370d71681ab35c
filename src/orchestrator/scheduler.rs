//! Dependency-ordered bulk launch with per-group barriers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info};

use super::LaunchOutcome;
use crate::error::{PilotError, Result};
use crate::registry::{Agent, Phase, barrier_groups};

#[async_trait]
pub trait AgentLauncher: Send + Sync {
    async fn launch(&self, agent: Agent) -> Result<LaunchOutcome>;
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentRun {
    pub agent: Agent,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<LaunchOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentRun {
    fn from_result(agent: Agent, result: Result<LaunchOutcome>) -> Self {
        let (outcome, error) = match result {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            agent,
            phase: agent.phase(),
            outcome,
            error,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub phases: Vec<Phase>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub runs: Vec<AgentRun>,
}

impl GroupReport {
    pub fn failed(&self) -> impl Iterator<Item = &AgentRun> {
        self.runs.iter().filter(|r| !r.succeeded())
    }

    pub fn phase_label(&self) -> String {
        self.phases
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleReport {
    pub groups: Vec<GroupReport>,
    /// Index of the group whose failure stopped the schedule.
    pub halted_after: Option<usize>,
}

impl ScheduleReport {
    pub fn is_success(&self) -> bool {
        self.halted_after.is_none()
    }

    pub fn into_result(self) -> Result<Self> {
        let Some(index) = self.halted_after else {
            return Ok(self);
        };
        let group = &self.groups[index];
        Err(PilotError::BarrierFailed {
            phases: group.phase_label(),
            failed: group.failed().map(|r| r.agent.to_string()).collect(),
        })
    }
}

/// Launches every agent group by group. Agents inside a group run
/// concurrently; the next group starts only after every launch in the
/// current one returned, and only if none of them failed.
pub struct PhaseScheduler {
    launcher: Arc<dyn AgentLauncher>,
    groups: Vec<Vec<Phase>>,
}

impl PhaseScheduler {
    pub fn new(launcher: Arc<dyn AgentLauncher>) -> Self {
        Self {
            launcher,
            groups: barrier_groups(),
        }
    }

    pub async fn launch_all(&self) -> ScheduleReport {
        let mut report = ScheduleReport::default();

        for (index, phases) in self.groups.iter().enumerate() {
            let group = self.run_group(phases).await;
            let failures = group.failed().count();

            info!(
                group = index + 1,
                phases = %group.phase_label(),
                launched = group.runs.len() - failures,
                failed = failures,
                "Barrier group finished"
            );

            report.groups.push(group);
            if failures > 0 {
                error!(group = index + 1, "Halting schedule after failed group");
                report.halted_after = Some(index);
                break;
            }
        }

        report
    }

    async fn run_group(&self, phases: &[Phase]) -> GroupReport {
        let agents: Vec<Agent> = phases.iter().flat_map(|p| p.agents()).collect();
        let started_at = Utc::now();

        debug!(phases = ?phases, agents = agents.len(), "Starting barrier group");

        let handles: Vec<_> = agents
            .iter()
            .map(|&agent| {
                let launcher = Arc::clone(&self.launcher);
                tokio::spawn(async move { launcher.launch(agent).await })
            })
            .collect();

        let runs = join_all(handles)
            .await
            .into_iter()
            .zip(&agents)
            .map(|(joined, &agent)| {
                let result = joined.unwrap_or_else(|e| {
                    Err(PilotError::Other(format!("launch task panicked: {}", e)))
                });
                if let Err(e) = &result {
                    error!(agent = %agent, error = %e, "Launch failed");
                }
                AgentRun::from_result(agent, result)
            })
            .collect();

        GroupReport {
            phases: phases.to_vec(),
            started_at,
            finished_at: Utc::now(),
            runs,
        }
    }
}
