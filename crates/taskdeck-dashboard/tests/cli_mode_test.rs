use std::process::Command;

fn scratch_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("taskdeck-cli-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

#[test]
fn cli_init_config_writes_defaults() {
    let binary_path = env!("CARGO_BIN_EXE_taskdeck");
    let dir = scratch_dir();
    let config_path = dir.join("taskdeck.yaml");

    let output = Command::new(binary_path)
        .arg("init-config")
        .arg(&config_path)
        .arg("--defaults")
        .env("TASKDECK_CREDENTIAL_PATH", dir.join("token"))
        .output()
        .expect("Failed to start taskdeck binary");

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let written = std::fs::read_to_string(&config_path).expect("config written");
    assert!(written.contains("http://127.0.0.1:8000"));
    assert!(written.contains("poll_interval_ms: 3000"));
}

#[test]
fn cli_list_without_login_fails() {
    let binary_path = env!("CARGO_BIN_EXE_taskdeck");
    let dir = scratch_dir();

    let output = Command::new(binary_path)
        .arg("list")
        .env("TASKDECK_CREDENTIAL_PATH", dir.join("token"))
        .env("TASKDECK_BASE_URL", "http://127.0.0.1:9")
        .output()
        .expect("Failed to start taskdeck binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not logged in"), "stderr: {stderr}");
}
