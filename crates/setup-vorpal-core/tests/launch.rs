//! Launch and readiness verification against real child processes.

use pretty_assertions::assert_eq;
use setup_vorpal_config::{BackendCredentials, RegistryBackend, ServiceList};
use setup_vorpal_core::{LaunchConfig, PID_STATE_KEY, SetupError, launch_and_verify};
use setup_vorpal_test_utils::{MemoryRuntime, fake_service, kill_service};
use std::path::Path;
use tempfile::tempdir;

fn launch_config(binary: &Path, log_path: &Path, backend: RegistryBackend) -> LaunchConfig {
    LaunchConfig {
        registry_backend: backend,
        s3_bucket: None,
        port: None,
        services: ServiceList::default(),
        service_binary: binary.to_path_buf(),
        log_path: log_path.to_path_buf(),
        credentials: BackendCredentials::default(),
    }
}

fn s3_credentials() -> BackendCredentials {
    BackendCredentials {
        aws_access_key_id: Some("AKIATEST".to_string()),
        aws_default_region: Some("us-east-2".to_string()),
        aws_secret_access_key: Some("secret".to_string()),
    }
}

fn process_alive(pid: u32) -> bool {
    // SAFETY: signal 0 only checks for existence.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

/// A service that exits inside the settle window fails with its log output.
#[tokio::test]
async fn exiting_service_reports_logs_and_saves_nothing() {
    let temp = tempdir().expect("tempdir");
    let binary = fake_service(
        temp.path(),
        "vorpal",
        "echo 'error: address already in use (port 23151)'\nexit 1",
    );
    let log_path = temp.path().join("vorpal_output.log");
    let runtime = MemoryRuntime::new();

    let err = launch_and_verify(
        &launch_config(&binary, &log_path, RegistryBackend::Local),
        &runtime,
    )
    .await
    .expect_err("service exits");

    match &err {
        SetupError::ServiceFailed { logs, .. } => {
            assert_eq!(logs, "error: address already in use (port 23151)\n");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err.to_string()
            .matches("error: address already in use (port 23151)")
            .count(),
        1
    );
    assert_eq!(runtime.state_len(), 0);
}

/// A live service has its PID recorded; non-s3 backends ignore credentials.
#[tokio::test]
async fn running_service_pid_is_saved() {
    let temp = tempdir().expect("tempdir");
    let binary = fake_service(temp.path(), "vorpal", "echo \"started $*\"\nexec sleep 30");
    let log_path = temp.path().join("vorpal_output.log");
    let runtime = MemoryRuntime::new();
    let mut config = launch_config(
        &binary,
        &log_path,
        RegistryBackend::Other("gha".to_string()),
    );
    config.port = Some(23151);

    let pid = launch_and_verify(&config, &runtime)
        .await
        .expect("service running");

    assert_eq!(runtime.state(PID_STATE_KEY), Some(pid.0.to_string()));
    assert_eq!(process_alive(pid.0), true);
    let logs = std::fs::read_to_string(&log_path).expect("log");
    assert_eq!(
        logs,
        "started system services start --services agent,registry,worker --registry-backend gha --port 23151\n"
    );
    kill_service(pid.0);
}

/// s3 settings reach the child through argv and its environment.
#[tokio::test]
async fn s3_backend_forwards_bucket_and_credentials() {
    let temp = tempdir().expect("tempdir");
    let binary = fake_service(
        temp.path(),
        "vorpal",
        "echo \"$AWS_ACCESS_KEY_ID $AWS_DEFAULT_REGION $AWS_SECRET_ACCESS_KEY\"\necho \"$*\"\nexec sleep 30",
    );
    let log_path = temp.path().join("vorpal_output.log");
    let runtime = MemoryRuntime::new();
    let mut config = launch_config(&binary, &log_path, RegistryBackend::S3);
    config.s3_bucket = Some("artifacts".to_string());
    config.credentials = s3_credentials();

    let pid = launch_and_verify(&config, &runtime)
        .await
        .expect("service running");
    kill_service(pid.0);

    let logs = std::fs::read_to_string(&log_path).expect("log");
    let lines = logs.lines().collect::<Vec<_>>();
    assert_eq!(lines[0], "AKIATEST us-east-2 secret");
    assert!(lines[1].ends_with("--registry-backend s3 --registry-backend-s3-bucket artifacts"));
}

/// Missing credentials stop the launch before anything is spawned.
#[tokio::test]
async fn s3_backend_without_access_key_never_spawns() {
    let temp = tempdir().expect("tempdir");
    let binary = fake_service(temp.path(), "vorpal", "exec sleep 30");
    let log_path = temp.path().join("vorpal_output.log");
    let runtime = MemoryRuntime::new();
    let mut config = launch_config(&binary, &log_path, RegistryBackend::S3);
    config.s3_bucket = Some("artifacts".to_string());
    config.credentials = BackendCredentials {
        aws_access_key_id: None,
        ..s3_credentials()
    };

    let err = launch_and_verify(&config, &runtime)
        .await
        .expect_err("credentials missing");

    assert_eq!(
        err.to_string(),
        "AWS_ACCESS_KEY_ID environment variable is required when using s3 backend"
    );
    assert_eq!(log_path.exists(), false);
    assert_eq!(runtime.state_len(), 0);
}

/// An empty bucket is reported even when every credential is present.
#[tokio::test]
async fn s3_backend_with_empty_bucket_names_the_bucket() {
    let temp = tempdir().expect("tempdir");
    let binary = fake_service(temp.path(), "vorpal", "exec sleep 30");
    let log_path = temp.path().join("vorpal_output.log");
    let runtime = MemoryRuntime::new();
    let mut config = launch_config(&binary, &log_path, RegistryBackend::S3);
    config.s3_bucket = Some(String::new());
    config.credentials = s3_credentials();

    let err = launch_and_verify(&config, &runtime)
        .await
        .expect_err("bucket missing");
    assert!(matches!(err, SetupError::MissingBucket));
}

/// A service killed by a signal inside the window fails like one that exited.
#[tokio::test]
async fn signal_killed_service_reports_failure() {
    let temp = tempdir().expect("tempdir");
    let binary = fake_service(temp.path(), "vorpal", "echo dying\nkill -9 $$");
    let log_path = temp.path().join("vorpal_output.log");
    let runtime = MemoryRuntime::new();

    let err = launch_and_verify(
        &launch_config(&binary, &log_path, RegistryBackend::Local),
        &runtime,
    )
    .await
    .expect_err("service killed");

    match &err {
        SetupError::ServiceFailed { status, logs } => {
            assert!(status.contains("signal"), "status: {status}");
            assert_eq!(logs, "dying\n");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(runtime.state_len(), 0);
}

/// The log echo after verification is best effort: a removed log is skipped.
#[tokio::test]
async fn missing_log_after_verification_keeps_pid() {
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("vorpal_output.log");
    let binary = fake_service(
        temp.path(),
        "vorpal",
        &format!("rm -f '{}'\nexec sleep 30", log_path.display()),
    );
    let runtime = MemoryRuntime::new();

    let pid = launch_and_verify(
        &launch_config(&binary, &log_path, RegistryBackend::Local),
        &runtime,
    )
    .await
    .expect("service running");
    kill_service(pid.0);

    assert_eq!(runtime.state(PID_STATE_KEY), Some(pid.0.to_string()));
    assert_eq!(log_path.exists(), false);
}

/// An unreadable log only warns; the verified PID is still returned.
#[tokio::test]
async fn unreadable_log_after_verification_keeps_pid() {
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("vorpal_output.log");
    let binary = fake_service(
        temp.path(),
        "vorpal",
        &format!(
            "rm -f '{path}'\nmkdir '{path}'\nexec sleep 30",
            path = log_path.display()
        ),
    );
    let runtime = MemoryRuntime::new();

    let pid = launch_and_verify(
        &launch_config(&binary, &log_path, RegistryBackend::Local),
        &runtime,
    )
    .await
    .expect("service running");
    kill_service(pid.0);

    assert_eq!(runtime.state(PID_STATE_KEY), Some(pid.0.to_string()));
    assert_eq!(log_path.is_dir(), true);
}
