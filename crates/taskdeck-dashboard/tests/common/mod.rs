/*
[INPUT]:  Mock server and scratch directories
[OUTPUT]: Shared fixtures for dashboard integration tests
[POS]:    Test infrastructure - shared across dashboard test modules
[UPDATE]: When adding new test patterns or fixtures
*/

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use taskdeck_dashboard::{Dashboard, DashboardConfig};
use wiremock::MockServer;

pub const TOKEN: &str = "opaque-test-token";

pub fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("taskdeck-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub fn config_for(server: &MockServer, dir: &Path) -> DashboardConfig {
    DashboardConfig {
        base_url: server.uri(),
        poll_interval_ms: 60_000,
        min_refresh_visible_ms: 10,
        credential_path: dir.join("token"),
        download_dir: dir.to_path_buf(),
        ..DashboardConfig::default()
    }
}

/// Dashboard against `server`, logged in through a persisted token file
pub fn logged_in_dashboard(server: &MockServer, dir: &Path) -> Dashboard {
    std::fs::write(dir.join("token"), TOKEN).expect("write token");
    Dashboard::from_config(&config_for(server, dir)).expect("build dashboard")
}

pub fn task_row(id: &str, status: &str, task_type: &str, created_at: &str) -> serde_json::Value {
    let payload = match task_type {
        "send_message" => serde_json::json!("hello"),
        "send_email" => serde_json::json!({"to": "ops@example.com", "subject": "s", "content": "c"}),
        _ => serde_json::json!({"title": "t", "content": "c"}),
    };
    serde_json::json!({
        "id": id,
        "status": status,
        "task_type": task_type,
        "payload": payload,
        "retries": 0,
        "result": null,
        "error_message": null,
        "run_at": "2026-10-18T08:00:00",
        "created_at": created_at,
        "completed_at": null,
        "logs": null
    })
}

pub fn list_body(rows: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({ "count": rows.len(), "tasks": rows })
}
