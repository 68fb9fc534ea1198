//! Logger setup. Inside a GitHub Actions job, warnings and errors become
//! workflow annotations and debug output follows the runner's debug switch.

use log::{Level, LevelFilter};
use setup_vorpal_core::runtime::escape_data;
use std::io::Write;

pub fn init() {
    let actions = std::env::var("GITHUB_ACTIONS").is_ok_and(|value| value == "true");
    let runner_debug = std::env::var("RUNNER_DEBUG").is_ok_and(|value| value == "1");

    let mut builder = env_logger::builder();
    builder.filter_level(default_level(runner_debug));
    builder.parse_default_env();
    if actions {
        builder
            .target(env_logger::Target::Stdout)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    annotate(record.level(), &record.args().to_string())
                )
            });
    } else {
        builder.format_timestamp_millis();
    }
    let _ = builder.try_init();
}

fn default_level(runner_debug: bool) -> LevelFilter {
    if runner_debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Render one record as a workflow command line.
fn annotate(level: Level, message: &str) -> String {
    match level {
        Level::Error => format!("::error::{}", escape_data(message)),
        Level::Warn => format!("::warning::{}", escape_data(message)),
        Level::Debug | Level::Trace => format!("::debug::{}", escape_data(message)),
        Level::Info => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn levels_map_to_workflow_commands() {
        assert_eq!(annotate(Level::Info, "Detected apt-get."), "Detected apt-get.");
        assert_eq!(
            annotate(Level::Warn, "apt-get update failed"),
            "::warning::apt-get update failed"
        );
        assert_eq!(annotate(Level::Trace, "probe"), "::debug::probe");
    }

    /// Multi-line errors stay a single annotation.
    #[test]
    fn error_annotations_escape_newlines() {
        assert_eq!(
            annotate(
                Level::Error,
                "Vorpal service failed to start (exit status: 1)\nService output:\n"
            ),
            "::error::Vorpal service failed to start (exit status: 1)%0AService output:%0A"
        );
    }

    #[test]
    fn runner_debug_raises_verbosity() {
        assert_eq!(default_level(false), LevelFilter::Info);
        assert_eq!(default_level(true), LevelFilter::Debug);
    }
}
