//! Best-effort sandbox provisioning tests.

use pretty_assertions::assert_eq;
use setup_vorpal_host::apparmor::BWRAP_PROFILE;
use setup_vorpal_host::{
    Elevation, PackageTool, SandboxPolicy, StepOutcome, install_sandbox_helper_if_tool_available,
    install_sandbox_policy, probe_package_tool,
};
use setup_vorpal_test_utils::RecordingRunner;
use std::time::Duration;
use tempfile::tempdir;

/// apt-get wins when both tools respond.
#[tokio::test]
async fn probe_prefers_apt_get() {
    let runner = RecordingRunner::new();
    assert_eq!(probe_package_tool(&runner).await, Some(PackageTool::AptGet));
    assert_eq!(runner.calls(), vec!["apt-get --version"]);

    let probe = &runner.specs()[0];
    assert_eq!(probe.silent, true);
    assert_eq!(probe.timeout, Some(Duration::from_secs(5)));
}

/// A failing apt-get falls back to apt.
#[tokio::test]
async fn probe_falls_back_to_apt() {
    let runner = RecordingRunner::new().exit_with("apt-get", 127);
    assert_eq!(probe_package_tool(&runner).await, Some(PackageTool::Apt));
    assert_eq!(runner.calls(), vec!["apt-get --version", "apt --version"]);
}

/// Spawn errors count as unavailable rather than failing.
#[tokio::test]
async fn probe_reports_none_when_tools_are_missing() {
    let runner = RecordingRunner::new().missing("apt-get").missing("apt");
    assert_eq!(probe_package_tool(&runner).await, None);
}

#[tokio::test]
async fn helper_install_skips_without_tool() {
    let runner = RecordingRunner::new();
    let outcome = install_sandbox_helper_if_tool_available(&runner, None, Elevation::Sudo).await;
    assert!(matches!(outcome, StepOutcome::Skipped(_)));
    assert_eq!(runner.calls().is_empty(), true);
}

#[tokio::test]
async fn helper_install_runs_update_then_install() {
    let runner = RecordingRunner::new();
    let outcome =
        install_sandbox_helper_if_tool_available(&runner, Some(PackageTool::Apt), Elevation::Sudo)
            .await;
    assert_eq!(outcome, StepOutcome::Completed);
    assert_eq!(
        runner.calls(),
        vec!["sudo apt update", "sudo apt install -y bubblewrap"]
    );
}

/// A failed update degrades the step and skips the install.
#[tokio::test]
async fn helper_install_degrades_on_update_failure() {
    let runner = RecordingRunner::new().exit_with("sudo apt-get update", 100);
    let outcome = install_sandbox_helper_if_tool_available(
        &runner,
        Some(PackageTool::AptGet),
        Elevation::Sudo,
    )
    .await;
    match outcome {
        StepOutcome::Degraded(reason) => assert!(reason.contains("update failed")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(runner.calls(), vec!["sudo apt-get update"]);
}

/// The profile is staged locally, moved with sudo, then the service restarted.
#[tokio::test]
async fn policy_install_stages_moves_and_restarts() {
    let temp = tempdir().expect("tempdir");
    let staging = temp.path().join("bwrap");
    let policy = SandboxPolicy::bwrap().with_staging_path(&staging);
    let runner = RecordingRunner::new();

    let outcome = install_sandbox_policy(&runner, &policy, Elevation::Sudo).await;

    assert_eq!(outcome, StepOutcome::Completed);
    assert_eq!(
        std::fs::read_to_string(&staging).expect("staged policy"),
        BWRAP_PROFILE
    );
    assert_eq!(
        runner.calls(),
        vec![
            format!("sudo mv {} /etc/apparmor.d/bwrap", staging.display()),
            "sudo systemctl restart apparmor.service".to_string(),
        ]
    );
}

/// A restart failure only warns; the policy still counts as installed.
#[tokio::test]
async fn policy_install_tolerates_restart_failure() {
    let temp = tempdir().expect("tempdir");
    let policy = SandboxPolicy::bwrap().with_staging_path(temp.path().join("bwrap"));
    let runner = RecordingRunner::new().exit_with("sudo systemctl", 1);

    let outcome = install_sandbox_policy(&runner, &policy, Elevation::Sudo).await;
    assert_eq!(outcome, StepOutcome::Completed);
}

/// A failed move stops the step before the restart.
#[tokio::test]
async fn policy_install_degrades_on_move_failure() {
    let temp = tempdir().expect("tempdir");
    let policy = SandboxPolicy::bwrap().with_staging_path(temp.path().join("bwrap"));
    let runner = RecordingRunner::new().exit_with("sudo mv", 1);

    let outcome = install_sandbox_policy(&runner, &policy, Elevation::Sudo).await;
    assert_eq!(outcome.is_degraded(), true);
    assert_eq!(runner.called("sudo systemctl"), false);
}

/// An unwritable staging location degrades without running any command.
#[tokio::test]
async fn policy_install_degrades_on_write_failure() {
    let temp = tempdir().expect("tempdir");
    let policy =
        SandboxPolicy::bwrap().with_staging_path(temp.path().join("missing").join("bwrap"));
    let runner = RecordingRunner::new();

    let outcome = install_sandbox_policy(&runner, &policy, Elevation::Sudo).await;
    match outcome {
        StepOutcome::Degraded(reason) => assert!(reason.contains("failed to write")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(runner.calls().is_empty(), true);
}
