//! Mapping between input names and the variables the Actions runner exports.

use super::INPUT_NAMES;

/// Variable name the runner uses for an input (`use-local-build` ->
/// `INPUT_USE-LOCAL-BUILD`).
pub(super) fn variable_name(input: &str) -> String {
    format!("INPUT_{}", input.replace(' ', "_").to_uppercase())
}

/// Resolve an environment variable back to a known input name.
pub(super) fn input_name(variable: &str) -> Option<&'static str> {
    if !variable.starts_with("INPUT_") {
        return None;
    }
    INPUT_NAMES
        .iter()
        .copied()
        .find(|input| variable_name(input) == variable)
}
