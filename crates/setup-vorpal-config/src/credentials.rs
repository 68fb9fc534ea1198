//! Registry backend credentials sourced from the process environment.

use std::fmt;

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

/// AWS values forwarded to the registry when the `s3` backend is selected.
///
/// Captured once in `main` and passed by value into validation and launch;
/// nothing below the binary reads these from the ambient environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BackendCredentials {
    pub aws_access_key_id: Option<String>,
    pub aws_default_region: Option<String>,
    pub aws_secret_access_key: Option<String>,
}

impl BackendCredentials {
    /// Capture credentials from the current process environment.
    ///
    /// Only the three AWS names are read; a value that is not valid UTF-8
    /// counts as missing.
    pub fn from_env() -> Self {
        Self::from_vars(
            [AWS_ACCESS_KEY_ID, AWS_DEFAULT_REGION, AWS_SECRET_ACCESS_KEY]
                .into_iter()
                .filter_map(|name| std::env::var(name).ok().map(|value| (name, value))),
        )
    }

    /// Capture credentials from an explicit set of variables.
    ///
    /// Empty values are treated as missing.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut credentials = Self::default();
        for (key, value) in vars {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                AWS_ACCESS_KEY_ID => credentials.aws_access_key_id = Some(value),
                AWS_DEFAULT_REGION => credentials.aws_default_region = Some(value),
                AWS_SECRET_ACCESS_KEY => credentials.aws_secret_access_key = Some(value),
                _ => {}
            }
        }
        credentials
    }

    /// Name/value pairs for the values that are present.
    pub fn env_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            (AWS_ACCESS_KEY_ID, self.aws_access_key_id.as_deref()),
            (AWS_DEFAULT_REGION, self.aws_default_region.as_deref()),
            (AWS_SECRET_ACCESS_KEY, self.aws_secret_access_key.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect()
    }
}

impl fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendCredentials")
            .field("aws_access_key_id", &self.aws_access_key_id.is_some())
            .field("aws_default_region", &self.aws_default_region)
            .field("aws_secret_access_key", &self.aws_secret_access_key.is_some())
            .finish()
    }
}
