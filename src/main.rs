use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use refactor_pilot::cli::{Cli, Commands, Display, OutputFormat};
use refactor_pilot::config::{PilotConfig, ProjectPaths};
use refactor_pilot::error::{PilotError, Result};
use refactor_pilot::orchestrator::{LifecycleController, PhaseScheduler};
use refactor_pilot::registry::{Agent, barrier_groups};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let display = Display::default();
            display.print_error(&e.to_string());
            if let PilotError::UnknownAgent(_) = e {
                let names: Vec<&str> = Agent::ALL.iter().map(|a| a.name()).collect();
                eprintln!("Known agents: {}", names.join(", "));
                eprintln!("{}", Cli::command().render_usage());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("refactor_pilot=debug")
    } else {
        EnvFilter::new("refactor_pilot=info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // Agent names are validated before touching the repository or config.
    let action = Action::try_from(cli.command)?;

    let start = match cli.repo {
        Some(repo) => repo,
        None => std::env::current_dir()?,
    };
    let root = ProjectPaths::discover(&start)?;
    let config_file = cli
        .config
        .unwrap_or_else(|| ProjectPaths::default_config_file(&root));
    let config = Arc::new(PilotConfig::load(&config_file).await?);
    debug!(path = %config_file.display(), "Loaded configuration");
    let paths = ProjectPaths::new(root, &config);

    let display = Display::new(&config.display);
    let controller = LifecycleController::new(Arc::clone(&config), paths);
    let ctx = CommandContext {
        display: &display,
        output: cli.output,
    };

    match action {
        Action::List => cmd_list(&ctx, &config),
        Action::All => cmd_all(&ctx, controller).await,
        Action::Launch(agent) => cmd_launch(&ctx, &controller, agent).await,
        Action::Status(agent) => cmd_status(&ctx, &controller, agent),
        Action::Merge(agent) => cmd_merge(&ctx, &controller, agent).await,
    }
}

/// A parsed command with its agent name resolved against the registry.
enum Action {
    List,
    All,
    Launch(Agent),
    Status(Agent),
    Merge(Agent),
}

impl TryFrom<Commands> for Action {
    type Error = PilotError;

    fn try_from(command: Commands) -> Result<Self> {
        Ok(match command {
            Commands::List => Self::List,
            Commands::All => Self::All,
            Commands::Launch { agent } => Self::Launch(agent.parse()?),
            Commands::Status { agent } => Self::Status(agent.parse()?),
            Commands::Merge { agent } => Self::Merge(agent.parse()?),
        })
    }
}

struct CommandContext<'a> {
    display: &'a Display,
    output: OutputFormat,
}

impl CommandContext<'_> {
    fn is_json(&self) -> bool {
        self.output == OutputFormat::Json
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

#[derive(Serialize)]
struct AgentEntry {
    agent: Agent,
    phase: String,
    group: usize,
    branch: String,
    depends_on: Vec<String>,
}

fn cmd_list(ctx: &CommandContext<'_>, config: &PilotConfig) -> Result<()> {
    let groups = barrier_groups();
    let prefix = &config.git.branch_prefix;

    if !ctx.is_json() {
        ctx.display.print_agents(&groups, prefix);
        return Ok(());
    }

    let entries: Vec<AgentEntry> = groups
        .iter()
        .enumerate()
        .flat_map(|(index, phases)| {
            phases.iter().flat_map(move |phase| {
                phase.agents().into_iter().map(move |agent| AgentEntry {
                    agent,
                    phase: phase.to_string(),
                    group: index + 1,
                    branch: agent.branch_name(prefix),
                    depends_on: phase.depends_on().iter().map(|p| p.to_string()).collect(),
                })
            })
        })
        .collect();
    ctx.print_json(&entries)
}

async fn cmd_launch(
    ctx: &CommandContext<'_>,
    controller: &LifecycleController,
    agent: Agent,
) -> Result<()> {
    let spinner = (!ctx.is_json())
        .then(|| ctx.display.create_spinner(&format!("Launching {}...", agent)));

    let result = controller.launch(agent).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = result?;

    if ctx.is_json() {
        return ctx.print_json(&outcome);
    }
    ctx.display.print_launch(agent, &outcome);
    Ok(())
}

async fn cmd_all(ctx: &CommandContext<'_>, controller: LifecycleController) -> Result<()> {
    let scheduler = PhaseScheduler::new(Arc::new(controller));
    let report = scheduler.launch_all().await;

    if ctx.is_json() {
        ctx.print_json(&report)?;
    } else {
        ctx.display.print_schedule(&report);
    }

    report.into_result().map(|_| ())
}

fn cmd_status(
    ctx: &CommandContext<'_>,
    controller: &LifecycleController,
    agent: Agent,
) -> Result<()> {
    let status = controller.status(agent)?;

    if ctx.is_json() {
        return ctx.print_json(&status);
    }
    ctx.display.print_status(&status);
    Ok(())
}

async fn cmd_merge(
    ctx: &CommandContext<'_>,
    controller: &LifecycleController,
    agent: Agent,
) -> Result<()> {
    let spinner = (!ctx.is_json()).then(|| {
        ctx.display
            .create_spinner(&format!("Merging {}...", controller.branch_name(agent)))
    });

    let result = controller.merge(agent).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let outcome = result?;

    if ctx.is_json() {
        return ctx.print_json(&outcome);
    }
    ctx.display.print_merge(&outcome);
    Ok(())
}
