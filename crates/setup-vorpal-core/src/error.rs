//! Error types for the setup sequence.

use setup_vorpal_host::HostError;
use thiserror::Error;

/// Fatal errors. Any of these aborts the run; best-effort steps report
/// `StepOutcome::Degraded` instead.
#[derive(Debug, Error)]
pub enum SetupError {
    /// No release tag was given for a download install.
    #[error("'version' input is required when 'use-local-build' is false.")]
    MissingVersion,
    /// The host cannot report POSIX user/group ids.
    #[error("Unable to get user/group ID - not supported on this platform")]
    UnsupportedPlatform,
    /// The s3 backend was selected without a bucket.
    #[error("registry-backend-s3-bucket is required when using s3 backend")]
    MissingBucket,
    /// The s3 backend was selected without one of the AWS variables.
    #[error("{0} environment variable is required when using s3 backend")]
    MissingCredential(&'static str),
    /// The service binary could not be located.
    #[error("service binary not found: {0}")]
    BinaryNotFound(String),
    /// The service process could not be spawned.
    #[error("failed to start {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },
    /// The service exited during the settle window.
    #[error("Vorpal service failed to start ({status})\nService output:\n{logs}")]
    ServiceFailed { status: String, logs: String },
    /// Writing job state failed.
    #[error("state error: {0}")]
    State(String),
    /// A required host command failed.
    #[error(transparent)]
    Host(#[from] HostError),
    /// Downloading the release failed.
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
