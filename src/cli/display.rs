use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{DisplayConfig, PilotConfig};
use crate::git::TreeState;
use crate::isolation::{AgentStatus, Lockstep, MergeOutcome, WorkspaceState};
use crate::orchestrator::{LaunchOutcome, ScheduleReport};
use crate::registry::{Agent, Phase};

/// Terminal palette, built once from `DisplayConfig`.
struct Palette {
    heading: Style,
    success: Style,
    error: Style,
    warning: Style,
    info: Style,
    dim: Style,
    bold: Style,
}

impl Palette {
    fn new(color: bool) -> Self {
        let styled = |s: Style| if color { s } else { s.force_styling(false) };
        Self {
            heading: styled(Style::new().bold().cyan()),
            success: styled(Style::new().green().bold()),
            error: styled(Style::new().red().bold()),
            warning: styled(Style::new().yellow().bold()),
            info: styled(Style::new().cyan()),
            dim: styled(Style::new().dim()),
            bold: styled(Style::new().bold()),
        }
    }
}

pub struct Display {
    palette: Palette,
}

impl Display {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            palette: Palette::new(config.color),
        }
    }

    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", self.palette.heading.apply_to(text));
        println!("{}", self.palette.dim.apply_to("═".repeat(60)));
        println!();
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", self.palette.success.apply_to("✓"), message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", self.palette.error.apply_to("✗"), message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", self.palette.warning.apply_to("!"), message);
    }

    pub fn print_info(&self, message: &str) {
        println!("{} {}", self.palette.info.apply_to("→"), message);
    }

    pub fn print_agents(&self, groups: &[Vec<Phase>], prefix: &str) {
        self.print_header("Agents");

        for (index, phases) in groups.iter().enumerate() {
            println!(
                "{}",
                self.palette.bold.apply_to(format!("Group {}", index + 1))
            );
            for phase in phases {
                for agent in phase.agents() {
                    println!(
                        "  {:<6} {:<22} {}",
                        phase.as_str(),
                        agent.name(),
                        self.palette.dim.apply_to(agent.branch_name(prefix))
                    );
                }
            }
        }
        println!();
    }

    pub fn print_status(&self, status: &AgentStatus) {
        self.print_header(&format!("Agent: {} (phase {})", status.agent, status.phase));

        let branch_state = if status.branch_exists {
            self.palette.success.apply_to("exists")
        } else {
            self.palette.dim.apply_to("absent")
        };
        println!("Branch:     {} [{}]", status.branch, branch_state);
        println!("Worktree:   {}", status.workspace_path.display());
        println!("State:      {}", self.workspace_label(status.workspace));

        match status.lockstep {
            Lockstep::InSync => {}
            Lockstep::BranchWithoutWorkspace => self.print_warning(
                "Branch exists without its worktree. Restore the worktree or delete the branch.",
            ),
            Lockstep::WorkspaceWithoutBranch => self.print_warning(
                "Worktree exists without its branch. Remove the directory before relaunching.",
            ),
        }

        if status.is_merge_ready() {
            self.print_info(&format!("Ready to merge: refactor-pilot merge {}", status.agent));
        }
    }

    fn workspace_label(&self, state: WorkspaceState) -> String {
        let label = state.label();
        match state {
            WorkspaceState::Absent => self.palette.dim.apply_to(label).to_string(),
            WorkspaceState::Present {
                tree: Some(TreeState::Clean),
                ..
            } => self.palette.success.apply_to(label).to_string(),
            WorkspaceState::Present { .. } => self.palette.warning.apply_to(label).to_string(),
        }
    }

    pub fn print_launch(&self, agent: Agent, outcome: &LaunchOutcome) {
        match outcome {
            LaunchOutcome::Launched {
                path, branch, plan, ..
            } => {
                self.print_success(&format!("Launched {} on {}", agent, branch));
                if plan.is_none() {
                    self.print_warning("Shared plan was missing; only the task file was bound");
                }
                self.print_next_steps(path);
            }
            LaunchOutcome::AlreadyExists { path } => {
                self.print_warning(&format!(
                    "Worktree for {} already exists: {}",
                    agent,
                    path.display()
                ));
                self.print_next_steps(path);
            }
        }
    }

    fn print_next_steps(&self, path: &std::path::Path) {
        println!();
        println!("{}", self.palette.bold.apply_to("Next steps:"));
        println!("  cd {}", path.display());
        println!("  # start the agent with TASK.md as its brief");
        println!("  # commit on the agent branch, then run `refactor-pilot merge <agent>`");
    }

    pub fn print_merge(&self, outcome: &MergeOutcome) {
        self.print_success(&format!("Merged {} into {}", outcome.branch, outcome.into));
        if outcome.workspace_removed {
            self.print_info(&format!(
                "Removed worktree {}",
                outcome.workspace.display()
            ));
        }
        self.print_info(&format!("Deleted branch {}", outcome.branch));
    }

    pub fn print_schedule(&self, report: &ScheduleReport) {
        self.print_header("Launch summary");

        for (index, group) in report.groups.iter().enumerate() {
            let elapsed = group.finished_at - group.started_at;
            println!(
                "{} [{}] {}",
                self.palette
                    .bold
                    .apply_to(format!("Group {}", index + 1)),
                group.phase_label(),
                self.palette
                    .dim
                    .apply_to(format!("{}ms", elapsed.num_milliseconds()))
            );
            for run in &group.runs {
                match (&run.outcome, &run.error) {
                    (Some(LaunchOutcome::Launched { path, .. }), _) => println!(
                        "  {} {:<22} {}",
                        self.palette.success.apply_to("✓"),
                        run.agent.name(),
                        path.display()
                    ),
                    (Some(LaunchOutcome::AlreadyExists { path }), _) => println!(
                        "  {} {:<22} {} (existing)",
                        self.palette.warning.apply_to("!"),
                        run.agent.name(),
                        path.display()
                    ),
                    (None, error) => println!(
                        "  {} {:<22} {}",
                        self.palette.error.apply_to("✗"),
                        run.agent.name(),
                        error.as_deref().unwrap_or("unknown error")
                    ),
                }
            }
        }

        let total = Phase::ALL.iter().map(|p| p.agents().len()).sum::<usize>();
        let dispatched: usize = report.groups.iter().map(|g| g.runs.len()).sum();
        if dispatched < total {
            println!();
            self.print_warning(&format!(
                "{} of {} agents were not started",
                total - dispatched,
                total
            ));
        }
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("static template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(&PilotConfig::default().display)
    }
}
