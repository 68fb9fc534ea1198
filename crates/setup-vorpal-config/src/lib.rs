//! Input models and layered input loading for the Vorpal setup action.
//!
//! This crate owns the action's input schema (`version`, `registry-backend`,
//! `services`, ...), the registry backend credentials captured from the
//! process environment, and the logic that merges input layers into a single
//! validated `ActionInputs` value.

mod credentials;
mod error;
mod loader;
mod model;

/// Backend credentials captured once at the process boundary.
pub use credentials::{
    AWS_ACCESS_KEY_ID, AWS_DEFAULT_REGION, AWS_SECRET_ACCESS_KEY, BackendCredentials,
};
/// Public error type returned by input loading and validation APIs.
pub use error::ConfigError;
/// Layered input types.
pub use loader::{InputLayer, InputLayerSource, LayeredInputs};
/// Input schema models.
pub use model::*;
