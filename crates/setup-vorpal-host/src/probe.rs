//! Platform capability probes.

use log::{debug, info};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::runner::CommandRunner;
use crate::types::CommandSpec;

/// Well-known install location of the bubblewrap sandbox helper.
pub const SANDBOX_HELPER_PATH: &str = "/usr/bin/bwrap";

/// Upper bound for a single `--version` probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Privileged package manager front-ends, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageTool {
    AptGet,
    Apt,
}

impl PackageTool {
    /// Candidates tried by [`probe_package_tool`], most preferred first.
    pub const PREFERENCE: [PackageTool; 2] = [PackageTool::AptGet, PackageTool::Apt];

    pub fn command(self) -> &'static str {
        match self {
            Self::AptGet => "apt-get",
            Self::Apt => "apt",
        }
    }
}

impl fmt::Display for PackageTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Return the first package tool whose `--version` succeeds.
///
/// Spawn failures, timeouts and non-zero exits all count as "unavailable".
pub async fn probe_package_tool(runner: &dyn CommandRunner) -> Option<PackageTool> {
    for tool in PackageTool::PREFERENCE {
        let spec = CommandSpec::new(tool.command())
            .arg("--version")
            .timeout(PROBE_TIMEOUT)
            .silent();
        match runner.run(spec).await {
            Ok(result) if result.success() => {
                info!("Detected {tool}.");
                return Some(tool);
            }
            Ok(result) => debug!(
                "package tool unavailable (tool={tool}, status={:?})",
                result.status_code
            ),
            Err(err) => debug!("package tool unavailable (tool={tool}, error={err})"),
        }
    }
    None
}

/// Whether the sandbox helper binary is installed at `path`.
pub fn probe_sandbox_helper_present(path: &Path) -> bool {
    let present = path.exists();
    debug!(
        "sandbox helper probe (path={}, present={present})",
        path.display()
    );
    present
}
