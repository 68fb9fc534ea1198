//! Detached service launch and readiness verification.
//!
//! The services expose no readiness endpoint, so "started" means the process
//! is still alive once [`SETTLE_WINDOW`] has elapsed. The log file is the only
//! channel back from the child: it is written by the service and read from
//! disk by us after the delays.

use log::{info, warn};
use setup_vorpal_config::{ActionInputs, BackendCredentials, RegistryBackend, ServiceList};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::fs::OpenOptions;
use tokio::process::Command;

use crate::credentials::{ValidatedS3, validate_backend};
use crate::runtime::JobRuntime;
use crate::SetupError;

/// Time given to the service to fail on bad arguments, a busy port, etc.
pub const SETTLE_WINDOW: Duration = Duration::from_millis(2000);
/// Extra wait before echoing the log so buffered output reaches the file.
pub const LOG_FLUSH_DELAY: Duration = Duration::from_millis(500);
/// Combined stdout/stderr of the service.
pub const DEFAULT_LOG_PATH: &str = "/tmp/vorpal_output.log";
/// State key read by the teardown step.
pub const PID_STATE_KEY: &str = "vorpal-pid";

/// Everything needed to start the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub registry_backend: RegistryBackend,
    pub s3_bucket: Option<String>,
    pub port: Option<u16>,
    pub services: ServiceList,
    pub service_binary: PathBuf,
    pub log_path: PathBuf,
    pub credentials: BackendCredentials,
}

impl LaunchConfig {
    /// Build a launch config from resolved inputs and captured credentials.
    pub fn from_inputs(
        inputs: &ActionInputs,
        credentials: BackendCredentials,
        service_binary: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry_backend: inputs.registry_backend.clone(),
            s3_bucket: inputs.registry_backend_s3_bucket.clone(),
            port: inputs.port,
            services: inputs.services.clone(),
            service_binary: service_binary.into(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            credentials,
        }
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }
}

/// PID of a verified, detached service. Only the number survives; the
/// process itself is no longer owned by this program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePid(pub u32);

impl fmt::Display for ServicePid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Argument vector for `vorpal system services start`.
pub fn service_args(config: &LaunchConfig, s3: Option<&ValidatedS3>) -> Vec<String> {
    let mut args = vec![
        "system".to_string(),
        "services".to_string(),
        "start".to_string(),
        "--services".to_string(),
        config.services.to_string(),
        "--registry-backend".to_string(),
        config.registry_backend.to_string(),
    ];
    if let Some(port) = config.port {
        args.push("--port".to_string());
        args.push(port.to_string());
    }
    if let Some(s3) = s3 {
        args.push("--registry-backend-s3-bucket".to_string());
        args.push(s3.bucket.clone());
    }
    args
}

/// Start the services detached, wait out the settle window, and record the
/// PID if the process is still running.
///
/// Fails without persisting anything when the process exits inside the
/// window; the error carries the full log contents.
pub async fn launch_and_verify(
    config: &LaunchConfig,
    runtime: &dyn JobRuntime,
) -> Result<ServicePid, SetupError> {
    info!("Starting Vorpal service...");

    let s3 = if config.registry_backend.is_s3() {
        validate_backend(
            &config.registry_backend,
            config.s3_bucket.as_deref(),
            &config.credentials,
        )?
    } else {
        None
    };
    let args = service_args(config, s3.as_ref());
    let binary = resolve_binary(&config.service_binary)?;
    info!(
        "Starting vorpal with command: {} {}",
        binary.display(),
        args.join(" ")
    );

    let log = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&config.log_path)
        .await?
        .into_std()
        .await;
    let log_stderr = log.try_clone()?;

    let mut cmd = Command::new(&binary);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(log))
        .stderr(Stdio::from(log_stderr))
        .kill_on_drop(false);
    if let Some(s3) = &s3 {
        cmd.envs(s3.credentials.env_pairs());
    }
    #[cfg(unix)]
    cmd.process_group(0);

    let started_at = Instant::now();
    let mut child = cmd.spawn().map_err(|source| SetupError::Spawn {
        binary: binary.display().to_string(),
        source,
    })?;
    // The child holds its own copies of the log descriptors; close ours.
    drop(cmd);

    tokio::time::sleep(SETTLE_WINDOW).await;

    if let Some(status) = child.try_wait()? {
        // The caller reports the logs through the error.
        let logs = read_logs(&config.log_path).await;
        return Err(SetupError::ServiceFailed {
            status: status.to_string(),
            logs,
        });
    }

    let Some(pid) = child.id() else {
        return Err(SetupError::ServiceFailed {
            status: "exited".to_string(),
            logs: read_logs(&config.log_path).await,
        });
    };
    let pid = ServicePid(pid);
    info!(
        "Vorpal service is running (PID: {pid}, after {}ms)",
        started_at.elapsed().as_millis()
    );
    runtime.save_state(PID_STATE_KEY, &pid.to_string())?;
    // Not killed on drop: the service outlives this process.
    drop(child);

    tokio::time::sleep(LOG_FLUSH_DELAY).await;
    echo_initial_logs(&config.log_path).await;

    Ok(pid)
}

/// Resolve bare program names through `PATH`.
fn resolve_binary(binary: &Path) -> Result<PathBuf, SetupError> {
    if binary.components().count() > 1 {
        return Ok(binary.to_path_buf());
    }
    which::which(binary).map_err(|err| {
        SetupError::BinaryNotFound(format!("{}: {err}", binary.display()))
    })
}

async fn read_logs(path: &Path) -> String {
    tokio::fs::read_to_string(path).await.unwrap_or_default()
}

async fn echo_initial_logs(path: &Path) {
    if !path.exists() {
        return;
    }
    match tokio::fs::read_to_string(path).await {
        Ok(logs) => {
            info!("Initial service logs:");
            info!("{logs}");
        }
        Err(err) => warn!(
            "could not read service log (path={}): {err}",
            path.display()
        ),
    }
}
