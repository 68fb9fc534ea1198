use parking_lot::Mutex;
use setup_vorpal_core::{JobRuntime, SetupError};
use std::path::{Path, PathBuf};

/// In-memory job runtime capturing saved state and exported paths.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    state: Mutex<Vec<(String, String)>>,
    paths: Mutex<Vec<PathBuf>>,
}

impl MemoryRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value saved under `name`.
    pub fn state(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn state_len(&self) -> usize {
        self.state.lock().len()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().clone()
    }
}

impl JobRuntime for MemoryRuntime {
    fn save_state(&self, name: &str, value: &str) -> Result<(), SetupError> {
        self.state.lock().push((name.to_string(), value.to_string()));
        Ok(())
    }

    fn add_path(&self, dir: &Path) -> Result<(), SetupError> {
        self.paths.lock().push(dir.to_path_buf());
        Ok(())
    }
}
