//! Side channels to the surrounding CI job: durable state and PATH export.

use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::SetupError;

/// Values the job keeps after this process exits.
pub trait JobRuntime: Send + Sync {
    /// Persist a named value for a later step (e.g. the post-job teardown).
    fn save_state(&self, name: &str, value: &str) -> Result<(), SetupError>;

    /// Prepend a directory to `PATH` for later steps.
    fn add_path(&self, dir: &Path) -> Result<(), SetupError>;
}

/// GitHub Actions runner file commands.
///
/// Uses the `GITHUB_STATE`/`GITHUB_PATH` files when the runner provides them
/// and falls back to the legacy stdout workflow commands otherwise.
#[derive(Debug, Clone, Default)]
pub struct ActionsRuntime {
    state_file: Option<PathBuf>,
    path_file: Option<PathBuf>,
}

impl ActionsRuntime {
    /// Read the file command locations from the environment.
    pub fn from_env() -> Self {
        Self {
            state_file: non_empty_var("GITHUB_STATE"),
            path_file: non_empty_var("GITHUB_PATH"),
        }
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    pub fn with_path_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path_file = Some(path.into());
        self
    }
}

impl JobRuntime for ActionsRuntime {
    fn save_state(&self, name: &str, value: &str) -> Result<(), SetupError> {
        match &self.state_file {
            Some(path) => append_line(path, &key_value_message(name, value)?),
            None => {
                println!(
                    "::save-state name={}::{}",
                    escape_property(name),
                    escape_data(value)
                );
                Ok(())
            }
        }
    }

    fn add_path(&self, dir: &Path) -> Result<(), SetupError> {
        let dir = dir.display().to_string();
        match &self.path_file {
            Some(path) => append_line(path, &dir),
            None => {
                println!("::add-path::{}", escape_data(&dir));
                Ok(())
            }
        }
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn append_line(path: &Path, message: &str) -> Result<(), SetupError> {
    debug!("appending file command (path={})", path.display());
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    writeln!(file, "{message}")?;
    Ok(())
}

/// `name<<delimiter` block understood by the runner's file commands.
fn key_value_message(name: &str, value: &str) -> Result<String, SetupError> {
    let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(SetupError::State(format!(
            "unexpected input: name or value contains the delimiter {delimiter}"
        )));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}"))
}

/// Escape a value for a workflow command line.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}
