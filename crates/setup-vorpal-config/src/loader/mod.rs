//! Layered input loader.
//!
//! Inputs come from up to three layers, merged low -> high: an optional JSON5
//! file, the `INPUT_*` variables the Actions runner exports, and explicit
//! command-line overrides. Empty values never override a lower layer, which
//! matches how the runner reports inputs the workflow did not set.

mod env;
mod merge;


use crate::{ActionInputs, ConfigError, RegistryBackend, ServiceList};
use log::{debug, info};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Input names understood by the action.
pub const INPUT_NAMES: &[&str] = &[
    "version",
    "use-local-build",
    "registry-backend",
    "registry-backend-s3-bucket",
    "port",
    "services",
];

/// Origin for a single input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayerSource {
    /// JSON5 inputs file.
    File,
    /// `INPUT_*` environment variables.
    Environment,
    /// Command-line overrides (highest precedence).
    CommandLine,
}

/// A single set of input values and where they came from.
#[derive(Debug, Clone)]
pub struct InputLayer {
    /// Layer origin.
    pub source: InputLayerSource,
    /// Location on disk for file layers.
    pub path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl InputLayer {
    /// Create an empty layer for the given source.
    pub fn new(source: InputLayerSource) -> Self {
        Self {
            source,
            path: None,
            values: Map::new(),
        }
    }

    /// Load a JSON5 inputs file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading inputs from path: {}", path.display());
        let contents = fs::read_to_string(path)?;
        let mut layer = Self::from_json5_str(&contents)?;
        layer.path = Some(path.to_path_buf());
        Ok(layer)
    }

    /// Parse JSON5 inputs contents.
    pub fn from_json5_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("parsing inputs from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        let Value::Object(values) = value else {
            return Err(ConfigError::InvalidField {
                name: "<root>".to_string(),
                message: "inputs file must contain an object".to_string(),
            });
        };
        let mut layer = Self::new(InputLayerSource::File);
        for (name, value) in values {
            layer.insert(&name, value)?;
        }
        Ok(layer)
    }

    /// Collect `INPUT_*` variables from the current process environment.
    ///
    /// Entries whose name or value is not valid UTF-8 are skipped.
    pub fn from_env() -> Self {
        Self::from_env_vars(std::env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    /// Collect `INPUT_*` variables from an explicit variable set.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut layer = Self::new(InputLayerSource::Environment);
        for (key, value) in vars {
            if let Some(name) = env::input_name(key.as_ref()) {
                layer.values.insert(name.to_string(), Value::String(value.into()));
            }
        }
        layer
    }

    /// Set a value on this layer, rejecting unknown input names.
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Result<Self, ConfigError> {
        self.insert(name, value.into())?;
        Ok(self)
    }

    /// Set a value only when one is provided.
    pub fn set_opt<T: Into<Value>>(self, name: &str, value: Option<T>) -> Result<Self, ConfigError> {
        match value {
            Some(value) => self.set(name, value),
            None => Ok(self),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn insert(&mut self, name: &str, value: Value) -> Result<(), ConfigError> {
        if !INPUT_NAMES.contains(&name) {
            return Err(ConfigError::InvalidField {
                name: name.to_string(),
                message: "unknown input".to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }
}

/// Resolved inputs plus metadata about which layers contributed.
#[derive(Debug, Clone)]
pub struct LayeredInputs {
    /// The merged, validated inputs.
    pub inputs: ActionInputs,
    /// Sources of the layers that were applied, low -> high.
    pub layers: Vec<(InputLayerSource, Option<PathBuf>)>,
}

impl ActionInputs {
    /// Load inputs from a single JSON5 document (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        let layer = InputLayer::from_json5_str(contents)?;
        Ok(Self::from_layers([layer])?.inputs)
    }

    /// Load the default layer stack: optional file, environment, overrides.
    pub fn load_layered(
        file: Option<&Path>,
        overrides: InputLayer,
    ) -> Result<LayeredInputs, ConfigError> {
        let mut layers = Vec::new();
        if let Some(path) = file {
            layers.push(InputLayer::from_path(path)?);
        }
        layers.push(InputLayer::from_env());
        layers.push(overrides);
        Self::from_layers(layers)
    }

    /// Merge layers in order and validate the result.
    pub fn from_layers(
        layers: impl IntoIterator<Item = InputLayer>,
    ) -> Result<LayeredInputs, ConfigError> {
        let mut merged = Map::new();
        let mut applied = Vec::new();
        for layer in layers {
            debug!(
                "applying input layer (source={:?}, values={})",
                layer.source,
                layer.values.len()
            );
            merge::merge_input_values(&mut merged, &layer.values);
            applied.push((layer.source, layer.path));
        }
        let raw: RawInputs = serde_json::from_value(Value::Object(merged))?;
        let inputs = raw.resolve()?;
        info!(
            "inputs resolved (layers={}, backend={}, services={}, local_build={})",
            applied.len(),
            inputs.registry_backend,
            inputs.services,
            inputs.use_local_build
        );
        Ok(LayeredInputs {
            inputs,
            layers: applied,
        })
    }
}

/// Scalar input value as it may appear in JSON5 or the environment.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::String(value) => value.trim().to_string(),
        }
    }
}

/// Merged, not yet validated inputs.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct RawInputs {
    version: Option<Scalar>,
    use_local_build: Option<Scalar>,
    registry_backend: Option<RegistryBackend>,
    registry_backend_s3_bucket: Option<Scalar>,
    port: Option<Scalar>,
    services: Option<Scalar>,
}

impl RawInputs {
    fn resolve(self) -> Result<ActionInputs, ConfigError> {
        // Only the exact string `true` enables a local build.
        let use_local_build = self
            .use_local_build
            .is_some_and(|value| value.into_text() == "true");
        let port = match text(self.port) {
            Some(port) => Some(port.parse::<u16>().map_err(|err| ConfigError::InvalidField {
                name: "port".to_string(),
                message: format!("'{port}' is not a valid port: {err}"),
            })?),
            None => None,
        };
        let services = match text(self.services) {
            Some(services) => ServiceList::parse(&services)?,
            None => ServiceList::default(),
        };
        Ok(ActionInputs {
            version: text(self.version),
            use_local_build,
            registry_backend: self.registry_backend.unwrap_or_default(),
            registry_backend_s3_bucket: text(self.registry_backend_s3_bucket),
            port,
            services,
        })
    }
}

fn text(value: Option<Scalar>) -> Option<String> {
    value
        .map(Scalar::into_text)
        .filter(|value| !value.is_empty())
}
