//! Key material generation, delegated to the Vorpal CLI.

use log::info;
use setup_vorpal_host::{CommandRunner, CommandSpec, run_checked};
use std::path::Path;

use crate::SetupError;

/// Run `vorpal system keys generate`.
pub async fn generate_keys(runner: &dyn CommandRunner, binary: &Path) -> Result<(), SetupError> {
    info!("Generating Vorpal keys...");
    let spec = CommandSpec::new(binary).args(["system", "keys", "generate"]);
    run_checked(runner, spec).await?;
    Ok(())
}
