//! Privileged creation of the Vorpal state directories.

use log::info;
use setup_vorpal_host::{CommandRunner, CommandSpec, Elevation, run_checked};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::SetupError;

/// Root of the Vorpal state tree.
pub const VORPAL_ROOT: &str = "/var/lib/vorpal";

/// Directories that must exist before the services start, and the root whose
/// ownership is handed back to the invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySpec {
    root: PathBuf,
    paths: Vec<PathBuf>,
}

impl DirectorySpec {
    /// The standard tree under `/var/lib/vorpal`.
    pub fn vorpal() -> Self {
        Self::under(VORPAL_ROOT)
    }

    /// The standard tree relocated under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let paths = [
            "key",
            "sandbox",
            "store",
            "store/artifact/alias",
            "store/artifact/archive",
            "store/artifact/config",
            "store/artifact/output",
        ]
        .into_iter()
        .map(|relative| root.join(relative))
        .collect();
        Self { root, paths }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Default for DirectorySpec {
    fn default() -> Self {
        Self::vorpal()
    }
}

/// Numeric user and group of the invoking process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uid, self.gid)
    }
}

/// Resolve the real uid/gid of this process.
#[cfg(unix)]
pub fn current_identity() -> Result<Identity, SetupError> {
    // SAFETY: getuid/getgid have no preconditions and cannot fail.
    let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
    Ok(Identity { uid, gid })
}

/// Resolve the real uid/gid of this process.
#[cfg(not(unix))]
pub fn current_identity() -> Result<Identity, SetupError> {
    Err(SetupError::UnsupportedPlatform)
}

/// Create every directory in `spec` and chown the root to the invoking user.
///
/// `mkdir -p` makes this safe to repeat against an existing tree.
pub async fn provision_directories(
    runner: &dyn CommandRunner,
    spec: &DirectorySpec,
    elevation: Elevation,
) -> Result<Identity, SetupError> {
    info!("Setting up Vorpal directories...");

    for dir in spec.paths() {
        let mkdir = CommandSpec::new("mkdir")
            .args(["-pv".to_string(), dir.display().to_string()])
            .elevated(elevation);
        run_checked(runner, mkdir).await?;
    }

    let identity = current_identity()?;
    info!("Setting ownership to {identity}");

    let chown = CommandSpec::new("chown")
        .args([
            "-R".to_string(),
            identity.to_string(),
            spec.root().display().to_string(),
        ])
        .elevated(elevation);
    run_checked(runner, chown).await?;
    Ok(identity)
}
