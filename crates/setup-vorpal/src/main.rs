//! Installs Vorpal on a CI runner and leaves its services running for later steps.

mod logging;

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info};
use setup_vorpal_config::{ActionInputs, BackendCredentials, InputLayer, InputLayerSource};
use setup_vorpal_core::{ActionsRuntime, DEFAULT_LOG_PATH, SetupSummary, Supervisor};
use setup_vorpal_host::{CommandRunner, SystemRunner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Command-line options. Every input may also come from `INPUT_*` variables.
#[derive(Debug, Parser)]
#[command(name = "setup-vorpal", version, about)]
struct Cli {
    /// Optional path to a JSON5 inputs file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Release tag to download (ignored with --use-local-build)
    #[arg(long = "vorpal-version", value_name = "TAG")]
    vorpal_version: Option<String>,
    /// Use the binary already built under ./dist
    #[arg(long, value_name = "BOOL")]
    use_local_build: Option<bool>,
    /// Registry backend passed to the service
    #[arg(long)]
    registry_backend: Option<String>,
    /// Bucket for the s3 registry backend
    #[arg(long)]
    registry_backend_s3_bucket: Option<String>,
    /// Port the services listen on
    #[arg(long)]
    port: Option<u16>,
    /// Comma-separated service roles
    #[arg(long)]
    services: Option<String>,
    /// Directory the binary is installed into (defaults to the current directory)
    #[arg(long, env = "GITHUB_WORKSPACE")]
    workdir: Option<PathBuf>,
    /// File capturing the service output
    #[arg(long, default_value = DEFAULT_LOG_PATH)]
    log_file: PathBuf,
    /// Skip the bubblewrap and AppArmor steps even on Linux
    #[arg(long)]
    skip_sandbox: bool,
}

impl Cli {
    fn input_layer(&self) -> anyhow::Result<InputLayer> {
        let layer = InputLayer::new(InputLayerSource::CommandLine)
            .set_opt("version", self.vorpal_version.clone())?
            .set_opt("use-local-build", self.use_local_build)?
            .set_opt("registry-backend", self.registry_backend.clone())?
            .set_opt(
                "registry-backend-s3-bucket",
                self.registry_backend_s3_bucket.clone(),
            )?
            .set_opt("port", self.port)?
            .set_opt("services", self.services.clone())?;
        Ok(layer)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(summary) => {
            info!(
                "setup complete (binary={}, pid={}, degraded_steps={})",
                summary.binary.display(),
                summary.pid,
                summary.report.degraded_count()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<SetupSummary> {
    // Captured once; nothing below reads the process environment for secrets.
    let credentials = BackendCredentials::from_env();

    let overrides = cli.input_layer()?;
    let layered = ActionInputs::load_layered(cli.config.as_deref(), overrides)
        .context("failed to load inputs")?;
    debug!(
        "inputs loaded (layers={}, backend={}, services={})",
        layered.layers.len(),
        layered.inputs.registry_backend,
        layered.inputs.services
    );

    let workdir = match cli.workdir {
        Some(dir) => dir,
        None => std::env::current_dir().context("cwd")?,
    };
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner::new());
    let mut supervisor = Supervisor::new(runner, Arc::new(ActionsRuntime::from_env()), workdir)
        .with_log_path(cli.log_file);
    if cli.skip_sandbox {
        supervisor = supervisor.with_sandbox_setup(false);
    }

    let summary = supervisor.run(&layered.inputs, credentials).await?;
    Ok(summary)
}
