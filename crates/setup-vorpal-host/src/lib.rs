//! Host capability probing and best-effort sandbox provisioning.
//!
//! Everything here shells out through a [`CommandRunner`] so callers can swap
//! the real process runner for a recording one in tests.

pub mod apparmor;
pub mod error;
pub mod outcome;
pub mod packages;
pub mod probe;
pub mod runner;
pub mod types;

/// Host error type.
pub use error::HostError;
/// AppArmor profile installation for the sandbox helper.
pub use apparmor::{SandboxPolicy, install_sandbox_policy};
/// Best-effort step results.
pub use outcome::{SetupReport, StepOutcome};
/// Package installation for the sandbox helper.
pub use packages::{SANDBOX_HELPER_PACKAGE, install_sandbox_helper_if_tool_available};
/// Capability probes.
pub use probe::{
    PackageTool, SANDBOX_HELPER_PATH, probe_package_tool, probe_sandbox_helper_present,
};
/// Command execution seam.
pub use runner::{CommandRunner, SystemRunner, run_checked};
/// Core command types.
pub use types::{CommandResult, CommandSpec, Elevation};

/// Whether the current build targets Linux, where the sandbox helper applies.
pub fn is_linux() -> bool {
    cfg!(target_os = "linux")
}
