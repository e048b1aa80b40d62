/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for taskdeck-adapter tests

use std::path::PathBuf;

use taskdeck_adapter::{ClientConfig, JwtManager, TaskServiceClient};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Mock bearer token for testing
pub fn mock_jwt_token() -> String {
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.e30.signature".to_string()
}

/// Client pointed at the mock server, already holding a token
pub fn authed_client(server: &MockServer) -> TaskServiceClient {
    let jwt = JwtManager::new();
    jwt.set_token(mock_jwt_token());
    TaskServiceClient::with_config(
        ClientConfig {
            base_url: server.uri(),
            ..ClientConfig::default()
        },
        jwt,
    )
    .expect("client init")
}

/// Unique scratch directory under the system temp dir
#[allow(dead_code)]
pub fn temp_dir() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("taskdeck-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&path).expect("create temp dir");
    path
}

/// One backend task row in the shape `GET /tasks/` returns
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
