//! Vorpal binary installation: local build or tagged release.

use log::info;
use setup_vorpal_config::ActionInputs;
use setup_vorpal_host::{CommandRunner, CommandSpec, run_checked};
use std::path::{Path, PathBuf};

use crate::SetupError;
use crate::runtime::JobRuntime;

/// Release download prefix; the tag and asset name are appended.
pub const RELEASE_BASE_URL: &str = "https://github.com/ALT-F4-LLC/vorpal/releases/download";

/// Where the binary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinarySource {
    /// Pre-built binary at `./dist/vorpal`.
    LocalBuild,
    /// Release archive for the given tag.
    Release { version: String },
}

impl BinarySource {
    /// Pick the source from inputs; a release needs a version.
    pub fn from_inputs(inputs: &ActionInputs) -> Result<Self, SetupError> {
        if inputs.use_local_build {
            return Ok(Self::LocalBuild);
        }
        match inputs.version.as_deref() {
            Some(version) if !version.is_empty() => Ok(Self::Release {
                version: version.to_string(),
            }),
            _ => Err(SetupError::MissingVersion),
        }
    }
}

/// Release asset name for an OS/arch pair (`std::env::consts` naming).
pub fn release_asset(os: &str, arch: &str) -> String {
    let os = if os == "macos" { "darwin" } else { "linux" };
    let arch = if arch == "x86_64" { "x86_64" } else { "aarch64" };
    format!("vorpal-{arch}-{os}.tar.gz")
}

/// Full download URL for a release asset.
pub fn release_url(version: &str, asset: &str) -> String {
    format!("{RELEASE_BASE_URL}/{version}/{asset}")
}

/// Install the binary into `workdir` and export its directory on `PATH`.
///
/// Returns the path of the installed executable.
pub async fn install_binary(
    runner: &dyn CommandRunner,
    runtime: &dyn JobRuntime,
    source: &BinarySource,
    workdir: &Path,
) -> Result<PathBuf, SetupError> {
    info!("Installing Vorpal...");

    let bin_dir = match source {
        BinarySource::LocalBuild => {
            info!("Using local build of vorpal");
            workdir.join("dist")
        }
        BinarySource::Release { version } => {
            let asset = release_asset(std::env::consts::OS, std::env::consts::ARCH);
            let url = release_url(version, &asset);
            download_release(runner, &url, &asset, workdir).await?;
            workdir.to_path_buf()
        }
    };

    let binary = bin_dir.join("vorpal");
    let chmod = CommandSpec::new("chmod").args(["+x".to_string(), binary.display().to_string()]);
    run_checked(runner, chmod).await?;
    runtime.add_path(&bin_dir)?;
    Ok(binary)
}

async fn download_release(
    runner: &dyn CommandRunner,
    url: &str,
    asset: &str,
    workdir: &Path,
) -> Result<(), SetupError> {
    info!("Downloading from {url}");
    let archive = workdir.join(asset);
    let bytes = reqwest::get(url)
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    tokio::fs::write(&archive, &bytes).await?;

    let extract = CommandSpec::new("tar")
        .args(["-xzf".to_string(), archive.display().to_string()])
        .cwd(workdir);
    run_checked(runner, extract).await?;
    tokio::fs::remove_file(&archive).await?;
    Ok(())
}
