//! Bootstrap, launch and readiness verification for the Vorpal services.
//!
//! The [`Supervisor`] runs the whole one-shot sequence: optional sandbox
//! provisioning, binary install, directory provisioning, key generation and
//! finally [`launch_and_verify`], which leaves a detached service running and
//! records its PID for the post-job teardown step.

pub mod credentials;
pub mod directories;
pub mod error;
pub mod install;
pub mod keys;
pub mod launch;
pub mod runtime;
pub mod supervisor;

pub use credentials::{ValidatedS3, validate_backend};
pub use directories::{
    DirectorySpec, Identity, VORPAL_ROOT, current_identity, provision_directories,
};
pub use error::SetupError;
pub use install::{BinarySource, install_binary, release_asset, release_url};
pub use keys::generate_keys;
pub use launch::{
    DEFAULT_LOG_PATH, LOG_FLUSH_DELAY, LaunchConfig, PID_STATE_KEY, SETTLE_WINDOW, ServicePid,
    launch_and_verify, service_args,
};
pub use runtime::{ActionsRuntime, JobRuntime};
pub use supervisor::{STEP_SANDBOX_HELPER, STEP_SANDBOX_POLICY, SetupSummary, Supervisor};
