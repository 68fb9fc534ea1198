//! AppArmor profile that lets bubblewrap create user namespaces.
//!
//! Recent Ubuntu runners restrict unprivileged user namespaces through
//! AppArmor, which breaks bwrap unless it has its own unconfined profile.

use log::{info, warn};
use std::path::PathBuf;

use crate::outcome::StepOutcome;
use crate::runner::{CommandRunner, run_checked};
use crate::types::{CommandSpec, Elevation};

/// Profile granting `/usr/bin/bwrap` the `userns` permission.
pub const BWRAP_PROFILE: &str = "abi <abi/4.0>,
include <tunables/global>

profile bwrap /usr/bin/bwrap flags=(unconfined) {
  userns,

  # Site-specific additions and overrides. See local/README for details.
  include if exists <local/bwrap>
}
";

/// A policy document and where it gets installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxPolicy {
    /// Profile text.
    pub contents: String,
    /// Transient file written before the privileged move.
    pub staging_path: PathBuf,
    /// System location the profile is moved to.
    pub install_path: PathBuf,
    /// Service restarted to load the profile.
    pub reload_service: String,
}

impl SandboxPolicy {
    /// The bubblewrap profile, staged as `./bwrap`.
    pub fn bwrap() -> Self {
        Self {
            contents: BWRAP_PROFILE.to_string(),
            staging_path: PathBuf::from("bwrap"),
            install_path: PathBuf::from("/etc/apparmor.d/bwrap"),
            reload_service: "apparmor.service".to_string(),
        }
    }

    pub fn with_staging_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.staging_path = path.into();
        self
    }

    pub fn with_install_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_path = path.into();
        self
    }
}

/// Write, move into place, and reload the policy.
///
/// A write or move failure degrades the step and stops it. A failed reload
/// only warns: the profile is installed and applies on the next reload.
pub async fn install_sandbox_policy(
    runner: &dyn CommandRunner,
    policy: &SandboxPolicy,
    elevation: Elevation,
) -> StepOutcome {
    info!("Configuring AppArmor policy for bubblewrap...");

    if let Err(err) = tokio::fs::write(&policy.staging_path, &policy.contents).await {
        return StepOutcome::degraded(format!(
            "failed to write {}: {err}",
            policy.staging_path.display()
        ));
    }

    let mv = CommandSpec::new("mv")
        .arg(policy.staging_path.display().to_string())
        .arg(policy.install_path.display().to_string())
        .elevated(elevation);
    if let Err(err) = run_checked(runner, mv).await {
        return StepOutcome::degraded(err);
    }

    let restart = CommandSpec::new("systemctl")
        .args(["restart", policy.reload_service.as_str()])
        .elevated(elevation);
    match run_checked(runner, restart).await {
        Ok(_) => info!("AppArmor service restarted."),
        Err(err) => warn!(
            "Could not restart {} (continuing): {err}",
            policy.reload_service
        ),
    }

    info!("AppArmor policy for bubblewrap configured.");
    StepOutcome::Completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bwrap_profile_grants_userns_with_local_overrides() {
        let policy = SandboxPolicy::bwrap();
        assert!(policy.contents.starts_with("abi <abi/4.0>,\n"));
        assert!(policy.contents.contains("profile bwrap /usr/bin/bwrap flags=(unconfined) {"));
        assert!(policy.contents.contains("  userns,\n"));
        assert!(policy.contents.contains("include if exists <local/bwrap>"));
        assert_eq!(policy.install_path, PathBuf::from("/etc/apparmor.d/bwrap"));
        assert_eq!(policy.reload_service, "apparmor.service");

        let relocated = policy.with_install_path("/tmp/apparmor.d/bwrap");
        assert_eq!(relocated.install_path, PathBuf::from("/tmp/apparmor.d/bwrap"));
    }
}
