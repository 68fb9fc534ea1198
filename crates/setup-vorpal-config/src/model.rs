//! Input schema for the Vorpal setup action.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry backend used when `registry-backend` is not set.
pub const DEFAULT_REGISTRY_BACKEND: &str = "local";
/// Service roles started when `services` is not set.
pub const DEFAULT_SERVICES: &str = "agent,registry,worker";

/// Storage backend for the Vorpal registry service.
///
/// Only `s3` carries extra requirements; every other value is forwarded to the
/// service unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RegistryBackend {
    #[default]
    Local,
    S3,
    Other(String),
}

impl RegistryBackend {
    /// Value passed to `--registry-backend`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local => "local",
            Self::S3 => "s3",
            Self::Other(name) => name,
        }
    }

    pub fn is_s3(&self) -> bool {
        matches!(self, Self::S3)
    }
}

impl From<String> for RegistryBackend {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "local" => Self::Local,
            "s3" => Self::S3,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<RegistryBackend> for String {
    fn from(value: RegistryBackend) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for RegistryBackend {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value.to_string()))
    }
}

impl fmt::Display for RegistryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, de-duplicated list of service roles (`agent`, `registry`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceList(Vec<String>);

impl ServiceList {
    /// Parse a comma separated role list, keeping first occurrences in order.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let mut roles: Vec<String> = Vec::new();
        for role in value.split(',').map(str::trim).filter(|role| !role.is_empty()) {
            if !roles.iter().any(|existing| existing == role) {
                roles.push(role.to_string());
            }
        }
        if roles.is_empty() {
            return Err(ConfigError::InvalidField {
                name: "services".to_string(),
                message: format!("expected at least one service role, got '{value}'"),
            });
        }
        Ok(Self(roles))
    }

    pub fn roles(&self) -> &[String] {
        &self.0
    }
}

impl Default for ServiceList {
    fn default() -> Self {
        Self(
            DEFAULT_SERVICES
                .split(',')
                .map(|role| role.to_string())
                .collect(),
        )
    }
}

impl fmt::Display for ServiceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

/// Fully resolved action inputs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionInputs {
    /// Release tag to download, required unless `use_local_build` is set.
    pub version: Option<String>,
    /// Use the pre-built binary under `./dist` instead of downloading.
    pub use_local_build: bool,
    /// Registry storage backend.
    pub registry_backend: RegistryBackend,
    /// Bucket name used by the `s3` backend.
    pub registry_backend_s3_bucket: Option<String>,
    /// Port override for the services.
    pub port: Option<u16>,
    /// Service roles to start.
    pub services: ServiceList,
}
