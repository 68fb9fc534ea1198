//! One-shot setup sequence.

use log::info;
use setup_vorpal_config::{ActionInputs, BackendCredentials};
use setup_vorpal_host::{
    CommandRunner, Elevation, PackageTool, SANDBOX_HELPER_PATH, SandboxPolicy, SetupReport,
    StepOutcome, install_sandbox_helper_if_tool_available, install_sandbox_policy,
    probe_package_tool, probe_sandbox_helper_present,
};
use std::path::PathBuf;
use std::sync::Arc;

use crate::SetupError;
use crate::directories::{DirectorySpec, provision_directories};
use crate::install::{BinarySource, install_binary};
use crate::keys::generate_keys;
use crate::launch::{DEFAULT_LOG_PATH, LaunchConfig, ServicePid, launch_and_verify};
use crate::runtime::JobRuntime;

/// Step names used in the [`SetupReport`].
pub const STEP_SANDBOX_HELPER: &str = "bubblewrap install";
pub const STEP_SANDBOX_POLICY: &str = "apparmor policy";

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct SetupSummary {
    /// Outcomes of the best-effort sandbox steps.
    pub report: SetupReport,
    /// Installed service binary.
    pub binary: PathBuf,
    /// PID of the detached service.
    pub pid: ServicePid,
}

/// Drives the setup sequence against a host.
pub struct Supervisor {
    runner: Arc<dyn CommandRunner>,
    runtime: Arc<dyn JobRuntime>,
    elevation: Elevation,
    directories: DirectorySpec,
    workdir: PathBuf,
    log_path: PathBuf,
    sandbox_setup: bool,
    helper_path: PathBuf,
    policy: SandboxPolicy,
}

impl Supervisor {
    /// Supervisor with the standard host locations.
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        runtime: Arc<dyn JobRuntime>,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        let workdir = workdir.into();
        Self {
            runner,
            runtime,
            elevation: Elevation::detect(),
            directories: DirectorySpec::vorpal(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            sandbox_setup: setup_vorpal_host::is_linux(),
            helper_path: PathBuf::from(SANDBOX_HELPER_PATH),
            policy: SandboxPolicy::bwrap().with_staging_path(workdir.join("bwrap")),
            workdir,
        }
    }

    pub fn with_elevation(mut self, elevation: Elevation) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_directories(mut self, directories: DirectorySpec) -> Self {
        self.directories = directories;
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Enable or disable the Linux sandbox steps.
    pub fn with_sandbox_setup(mut self, enabled: bool) -> Self {
        self.sandbox_setup = enabled;
        self
    }

    pub fn with_helper_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.helper_path = path.into();
        self
    }

    pub fn with_policy(mut self, policy: SandboxPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run every step. Sandbox steps degrade; everything else is fatal.
    pub async fn run(
        &self,
        inputs: &ActionInputs,
        credentials: BackendCredentials,
    ) -> Result<SetupSummary, SetupError> {
        let mut report = SetupReport::new();
        if self.sandbox_setup {
            info!("Linux platform detected.");
            self.prepare_sandbox(&mut report).await;
        }

        let source = BinarySource::from_inputs(inputs)?;
        let binary = install_binary(
            self.runner.as_ref(),
            self.runtime.as_ref(),
            &source,
            &self.workdir,
        )
        .await?;
        provision_directories(self.runner.as_ref(), &self.directories, self.elevation).await?;
        generate_keys(self.runner.as_ref(), &binary).await?;

        let config = LaunchConfig::from_inputs(inputs, credentials, binary.clone())
            .with_log_path(self.log_path.clone());
        let pid = launch_and_verify(&config, self.runtime.as_ref()).await?;

        if report.degraded_count() > 0 {
            info!(
                "setup finished with degraded sandbox steps (degraded={})",
                report.degraded_count()
            );
        }
        Ok(SetupSummary {
            report,
            binary,
            pid,
        })
    }

    async fn prepare_sandbox(&self, report: &mut SetupReport) {
        let tool: Option<PackageTool> = probe_package_tool(self.runner.as_ref()).await;
        let outcome =
            install_sandbox_helper_if_tool_available(self.runner.as_ref(), tool, self.elevation)
                .await;
        report.record(STEP_SANDBOX_HELPER, outcome);

        let outcome = if probe_sandbox_helper_present(&self.helper_path) {
            install_sandbox_policy(self.runner.as_ref(), &self.policy, self.elevation).await
        } else {
            info!(
                "{} not found; skipping AppArmor policy setup.",
                self.helper_path.display()
            );
            StepOutcome::skipped("sandbox helper not installed")
        };
        report.record(STEP_SANDBOX_POLICY, outcome);
    }
}
