use async_trait::async_trait;
use parking_lot::Mutex;
use setup_vorpal_host::{CommandResult, CommandRunner, CommandSpec, HostError};

#[derive(Debug, Clone)]
enum Scripted {
    Exit(i32),
    SpawnError,
}

/// Command runner that records every command and answers from a script.
///
/// Commands succeed with exit code 0 unless a rule registered with
/// [`RecordingRunner::exit_with`] or [`RecordingRunner::missing`] matches the
/// start of the displayed command line. The first matching rule wins.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    rules: Vec<(String, Scripted)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` exit with `code`.
    pub fn exit_with(mut self, prefix: impl Into<String>, code: i32) -> Self {
        self.rules.push((prefix.into(), Scripted::Exit(code)));
        self
    }

    /// Commands starting with `prefix` fail to spawn.
    pub fn missing(mut self, prefix: impl Into<String>) -> Self {
        self.rules.push((prefix.into(), Scripted::SpawnError));
        self
    }

    /// Displayed command lines in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(CommandSpec::display).collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(prefix))
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: CommandSpec) -> Result<CommandResult, HostError> {
        let display = spec.display();
        self.calls.lock().push(spec);
        let scripted = self
            .rules
            .iter()
            .find(|(prefix, _)| display.starts_with(prefix.as_str()))
            .map(|(_, scripted)| scripted.clone())
            .unwrap_or(Scripted::Exit(0));
        match scripted {
            Scripted::Exit(code) => Ok(CommandResult {
                status_code: Some(code),
                stdout: String::new(),
                stderr: String::new(),
            }),
            Scripted::SpawnError => Err(HostError::Spawn {
                command: display,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}
