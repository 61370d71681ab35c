mod fixtures;

use std::fs;

use fixtures::repo::{TestRepo, git};
use refactor_pilot::PilotError;
use refactor_pilot::config::PilotConfig;
use refactor_pilot::git::TreeState;
use refactor_pilot::isolation::{Lockstep, WorkspaceState};
use refactor_pilot::orchestrator::LaunchOutcome;
use refactor_pilot::registry::Agent;

#[tokio::test]
async fn test_launch_provisions_and_binds_workspace() {
    let repo = TestRepo::new();
    repo.add_task(Agent::IbkrSplitter, "Split the IBKR client\n");
    repo.add_plan("Phase plan\n");
    fs::write(repo.root.join(".env"), "IBKR_TOKEN=secret\n").unwrap();

    let outcome = repo.controller().launch(Agent::IbkrSplitter).await.unwrap();

    let expected = repo.dir.path().canonicalize().unwrap().join("trader-refactor-ibkr-splitter-1.1");
    match &outcome {
        LaunchOutcome::Launched { path, branch, plan, .. } => {
            assert_eq!(path, &expected);
            assert_eq!(branch, "refactor/ibkr-splitter-1.1");
            assert!(plan.is_some());
        }
        other => panic!("expected Launched, got {other:?}"),
    }

    assert!(repo.branch_exists("refactor/ibkr-splitter-1.1"));
    assert_eq!(
        fs::read_to_string(expected.join("TASK.md")).unwrap(),
        "Split the IBKR client\n"
    );
    assert!(expected.join(".claude/plans/PLAN.md").is_file());
    assert!(expected.join(".env").is_file());
    assert!(expected.join("README.md").is_file());
}

#[tokio::test]
async fn test_second_launch_is_a_no_op() {
    let repo = TestRepo::new();
    let task = repo.add_task(Agent::CliExtractor, "v1\n");
    let controller = repo.controller();

    let first = controller.launch(Agent::CliExtractor).await.unwrap();
    let worktrees = repo.worktree_count();

    // A changed task must not be re-bound by a skipped launch.
    fs::write(&task, "v2\n").unwrap();
    let second = controller.launch(Agent::CliExtractor).await.unwrap();

    assert_eq!(
        second,
        LaunchOutcome::AlreadyExists {
            path: first.path().to_path_buf()
        }
    );
    assert_eq!(repo.worktree_count(), worktrees);
    assert_eq!(
        fs::read_to_string(first.path().join("TASK.md")).unwrap(),
        "v1\n"
    );
}

#[tokio::test]
async fn test_missing_task_creates_no_branch_or_workspace() {
    let repo = TestRepo::new();

    let err = repo
        .controller()
        .launch(Agent::IbkrSplitter)
        .await
        .unwrap_err();

    match err {
        PilotError::TaskFileNotFound { path } => {
            assert!(path.ends_with("refactor/tasks/ibkr-splitter.md"));
        }
        other => panic!("expected TaskFileNotFound, got {other:?}"),
    }
    assert!(!repo.branch_exists("refactor/ibkr-splitter-1.1"));
    assert!(!repo.workspace(Agent::IbkrSplitter).exists());
    assert_eq!(repo.worktree_count(), 1);
}

#[tokio::test]
async fn test_existing_branch_without_workspace_is_fatal() {
    let repo = TestRepo::new();
    repo.add_task(Agent::ConfigUnifier, "unify\n");
    git(&repo.root, &["branch", "refactor/config-unifier-2"]);

    let err = repo
        .controller()
        .launch(Agent::ConfigUnifier)
        .await
        .unwrap_err();

    assert!(matches!(err, PilotError::BranchExists(ref b) if b == "refactor/config-unifier-2"));
    assert!(!repo.workspace(Agent::ConfigUnifier).exists());
}

#[tokio::test]
async fn test_failed_environment_install_leaves_partial_workspace() {
    let repo = TestRepo::new();
    repo.add_task(Agent::StorageLayer, "storage\n");

    let mut config = TestRepo::config();
    config.environment.install = vec!["false".to_string()];

    let err = repo
        .controller_with(config)
        .launch(Agent::StorageLayer)
        .await
        .unwrap_err();

    assert!(matches!(err, PilotError::CommandFailed { .. }));
    let workspace = repo.workspace(Agent::StorageLayer);
    assert!(workspace.exists());
    assert!(repo.branch_exists("refactor/storage-layer-4"));
    assert!(!workspace.join("TASK.md").exists());
}

#[tokio::test]
async fn test_status_tracks_workspace_state() {
    let repo = TestRepo::new();
    repo.add_task(Agent::TestHardening, "tests\n");
    let controller = repo.controller();

    let before = controller.status(Agent::TestHardening).unwrap();
    assert_eq!(before.workspace, WorkspaceState::Absent);
    assert!(!before.branch_exists);
    assert_eq!(before.lockstep, Lockstep::InSync);

    controller.launch(Agent::TestHardening).await.unwrap();
    let workspace = repo.workspace(Agent::TestHardening);

    // The bound TASK.md is untracked and does not make the checkout dirty.
    let bound = controller.status(Agent::TestHardening).unwrap();
    assert!(bound.branch_exists);
    assert_eq!(
        bound.workspace,
        WorkspaceState::Present {
            bound: true,
            tree: Some(TreeState::Clean)
        }
    );
    assert!(bound.is_merge_ready());

    fs::write(workspace.join("README.md"), "# edited by agent\n").unwrap();
    let dirty = controller.status(Agent::TestHardening).unwrap();
    assert!(matches!(
        dirty.workspace,
        WorkspaceState::Present { bound: true, tree: Some(TreeState::Dirty { entries: 1 }) }
    ));
    assert!(!dirty.is_merge_ready());

    git(&workspace, &["commit", "-q", "-am", "edit readme"]);
    assert!(controller.status(Agent::TestHardening).unwrap().is_merge_ready());
}

#[tokio::test]
async fn test_status_surfaces_branch_without_workspace() {
    let repo = TestRepo::new();
    git(&repo.root, &["branch", "refactor/oauth-consolidator-3"]);

    let status = repo.controller().status(Agent::OauthConsolidator).unwrap();

    assert_eq!(status.lockstep, Lockstep::BranchWithoutWorkspace);
    assert!(!status.is_merge_ready());
}

#[tokio::test]
async fn test_custom_prefix_changes_branch_and_workspace() {
    let repo = TestRepo::new();
    repo.add_task(Agent::StrategySimplify, "simplify\n");

    let mut config: PilotConfig = TestRepo::config();
    config.git.branch_prefix = "agents".to_string();

    let outcome = repo
        .controller_with(config)
        .launch(Agent::StrategySimplify)
        .await
        .unwrap();

    assert!(repo.branch_exists("agents/strategy-simplify-1.2"));
    assert!(
        outcome
            .path()
            .ends_with("trader-agents-strategy-simplify-1.2")
    );
}
