//! Host command error types.

/// Errors returned while running host commands.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The program could not be started.
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// The program ran but reported failure.
    #[error("The process '{command}' failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },
    /// The program was terminated by a signal.
    #[error("The process '{command}' was terminated by a signal")]
    Terminated { command: String },
    /// The program did not finish within its timeout.
    #[error("The process '{command}' timed out after {seconds}s")]
    TimedOut { command: String, seconds: u64 },
}
