//! Validation for the s3 registry backend.

use log::info;
use setup_vorpal_config::{
    AWS_ACCESS_KEY_ID, AWS_DEFAULT_REGION, AWS_SECRET_ACCESS_KEY, BackendCredentials,
    RegistryBackend,
};

use crate::SetupError;

/// s3 settings that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedS3 {
    pub bucket: String,
    pub credentials: BackendCredentials,
}

/// Check the settings a backend needs before launch.
///
/// Only `s3` has requirements: the bucket and all three AWS values, checked
/// in a fixed order (bucket, access key, region, secret key) with the first
/// missing item reported. Every other backend yields `None`.
pub fn validate_backend(
    backend: &RegistryBackend,
    bucket: Option<&str>,
    credentials: &BackendCredentials,
) -> Result<Option<ValidatedS3>, SetupError> {
    if !backend.is_s3() {
        return Ok(None);
    }
    let bucket = match bucket {
        Some(bucket) if !bucket.is_empty() => bucket,
        _ => return Err(SetupError::MissingBucket),
    };
    let required = [
        (AWS_ACCESS_KEY_ID, &credentials.aws_access_key_id),
        (AWS_DEFAULT_REGION, &credentials.aws_default_region),
        (AWS_SECRET_ACCESS_KEY, &credentials.aws_secret_access_key),
    ];
    for (name, value) in required {
        if value.as_deref().is_none_or(str::is_empty) {
            return Err(SetupError::MissingCredential(name));
        }
    }

    info!("AWS credentials validated for S3 backend");
    Ok(Some(ValidatedS3 {
        bucket: bucket.to_string(),
        credentials: credentials.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn validate_s3(
        bucket: Option<&str>,
        credentials: &BackendCredentials,
    ) -> Result<Option<ValidatedS3>, SetupError> {
        validate_backend(&RegistryBackend::S3, bucket, credentials)
    }

    fn full_credentials() -> BackendCredentials {
        BackendCredentials {
            aws_access_key_id: Some("AKIA".to_string()),
            aws_default_region: Some("us-east-2".to_string()),
            aws_secret_access_key: Some("secret".to_string()),
        }
    }

    #[test]
    fn empty_bucket_is_reported_before_credentials() {
        let err = validate_s3(Some(""), &full_credentials()).expect_err("bucket");
        assert!(matches!(err, SetupError::MissingBucket));
        assert!(err.to_string().contains("registry-backend-s3-bucket"));

        let err = validate_s3(None, &BackendCredentials::default()).expect_err("bucket");
        assert!(matches!(err, SetupError::MissingBucket));
    }

    #[test]
    fn missing_access_key_is_named() {
        let mut credentials = BackendCredentials::default();
        credentials.aws_secret_access_key = Some("secret".to_string());
        let err = validate_s3(Some("bucket"), &credentials).expect_err("access key");
        assert_eq!(
            err.to_string(),
            "AWS_ACCESS_KEY_ID environment variable is required when using s3 backend"
        );
    }

    #[test]
    fn region_is_checked_before_secret() {
        let mut credentials = full_credentials();
        credentials.aws_default_region = None;
        credentials.aws_secret_access_key = None;
        let err = validate_s3(Some("bucket"), &credentials).expect_err("region");
        assert!(matches!(err, SetupError::MissingCredential(AWS_DEFAULT_REGION)));

        let mut credentials = full_credentials();
        credentials.aws_secret_access_key = Some(String::new());
        let err = validate_s3(Some("bucket"), &credentials).expect_err("secret");
        assert!(matches!(err, SetupError::MissingCredential(AWS_SECRET_ACCESS_KEY)));
    }

    #[test]
    fn complete_settings_validate() {
        let validated = validate_s3(Some("artifacts"), &full_credentials())
            .expect("valid")
            .expect("s3 settings");
        assert_eq!(validated.bucket, "artifacts");
        assert_eq!(validated.credentials, full_credentials());
    }

    /// Other backends are never checked, even with nothing configured.
    #[test]
    fn non_s3_backends_need_nothing() {
        let empty = BackendCredentials::default();
        for backend in [RegistryBackend::Local, RegistryBackend::Other("gha".to_string())] {
            assert_eq!(validate_backend(&backend, None, &empty).expect("valid"), None);
        }
    }
}
