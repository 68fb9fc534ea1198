//! Command runner seam and the process-backed implementation.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::HostError;
use crate::types::{CommandResult, CommandSpec};

/// Executes host commands to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command and wait for it to exit.
    ///
    /// A non-zero exit is reported through `CommandResult::status_code`, not as
    /// an error; use [`run_checked`] when failure should abort.
    async fn run(&self, spec: CommandSpec) -> Result<CommandResult, HostError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandResult, HostError> {
        let display = spec.display();
        if spec.silent {
            debug!("[command]{display}");
        } else {
            info!("[command]{display}");
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        let child = cmd.spawn().map_err(|source| HostError::Spawn {
            command: display.clone(),
            source,
        })?;
        let output = match spec.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| HostError::TimedOut {
                    command: display.clone(),
                    seconds: timeout.as_secs(),
                })??,
            None => child.wait_with_output().await?,
        };

        let result = CommandResult {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };
        if !spec.silent {
            echo_output(&result);
        }
        Ok(result)
    }
}

/// Run a command and turn a non-zero exit into an error.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    spec: CommandSpec,
) -> Result<CommandResult, HostError> {
    let command = spec.display();
    let result = runner.run(spec).await?;
    match result.status_code {
        Some(0) => Ok(result),
        Some(code) => {
            warn!("command exited non-zero (command={command}, code={code})");
            Err(HostError::CommandFailed { command, code })
        }
        None => Err(HostError::Terminated { command }),
    }
}

fn echo_output(result: &CommandResult) {
    for line in result.stdout.lines().chain(result.stderr.lines()) {
        info!("{line}");
    }
}
