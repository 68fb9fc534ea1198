//! Test helpers shared across setup-vorpal crates.

pub mod runner;
pub mod runtime;
pub mod service;

pub use runner::RecordingRunner;
pub use runtime::MemoryRuntime;
pub use service::{fake_service, kill_service};
