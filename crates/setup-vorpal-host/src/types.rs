//! Command specification and result types.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Command execution specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute, resolved through `PATH` when not absolute.
    pub program: PathBuf,
    /// Command-line arguments.
    pub args: Vec<String>,
    /// Extra environment variables layered over the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Optional working directory.
    pub cwd: Option<PathBuf>,
    /// Kill the command if it runs longer than this.
    pub timeout: Option<Duration>,
    /// Suppress command echo and output logging.
    pub silent: bool,
}

impl CommandSpec {
    /// Create a new command spec for a program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
            timeout: None,
            silent: false,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Wrap this command with the given elevation strategy.
    pub fn elevated(self, elevation: Elevation) -> Self {
        elevation.wrap(self)
    }

    /// Human readable command line, as echoed in the job log.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Command execution result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit status code, `None` when terminated by a signal.
    pub status_code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// How privileged commands are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Elevation {
    /// Prefix commands with `sudo`.
    #[default]
    Sudo,
    /// Run commands as the current user.
    Direct,
}

impl Elevation {
    /// Use `sudo` unless the process already runs as root.
    pub fn detect() -> Self {
        #[cfg(unix)]
        {
            // SAFETY: geteuid has no preconditions and cannot fail.
            if unsafe { libc::geteuid() } == 0 {
                return Self::Direct;
            }
        }
        Self::Sudo
    }

    fn wrap(self, spec: CommandSpec) -> CommandSpec {
        match self {
            Self::Direct => spec,
            Self::Sudo => {
                let mut args = Vec::with_capacity(spec.args.len() + 1);
                args.push(spec.program.display().to_string());
                args.extend(spec.args);
                CommandSpec {
                    program: PathBuf::from("sudo"),
                    args,
                    ..spec
                }
            }
        }
    }
}
