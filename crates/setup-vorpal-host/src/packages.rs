//! Sandbox helper installation through the host package manager.

use log::info;

use crate::outcome::StepOutcome;
use crate::probe::PackageTool;
use crate::runner::{CommandRunner, run_checked};
use crate::types::{CommandSpec, Elevation};

/// Package providing `/usr/bin/bwrap`.
pub const SANDBOX_HELPER_PACKAGE: &str = "bubblewrap";

/// Install bubblewrap with the detected tool, or skip when there is none.
pub async fn install_sandbox_helper_if_tool_available(
    runner: &dyn CommandRunner,
    tool: Option<PackageTool>,
    elevation: Elevation,
) -> StepOutcome {
    let Some(tool) = tool else {
        info!("apt/apt-get not available; skipping bubblewrap install.");
        return StepOutcome::skipped("no supported package tool");
    };

    info!("Detected {tool}. Installing {SANDBOX_HELPER_PACKAGE}...");

    let update = CommandSpec::new(tool.command())
        .arg("update")
        .elevated(elevation);
    if let Err(err) = run_checked(runner, update).await {
        return StepOutcome::degraded(format!("{tool} update failed: {err}"));
    }

    let install = CommandSpec::new(tool.command())
        .args(["install", "-y", SANDBOX_HELPER_PACKAGE])
        .elevated(elevation);
    if let Err(err) = run_checked(runner, install).await {
        return StepOutcome::degraded(format!("{tool} install failed: {err}"));
    }

    info!("{SANDBOX_HELPER_PACKAGE} installation completed ({tool}).");
    StepOutcome::Completed
}
