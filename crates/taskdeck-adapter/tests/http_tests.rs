/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for HTTP client
[POS]:    Integration tests - task endpoints
[UPDATE]: When HTTP endpoints change
*/

mod common;

use common::{authed_client, mock_jwt_token, setup_mock_server, task_row};
use taskdeck_adapter::{
    ClientConfig, JwtManager, TaskServiceClient, TaskStatus, TaskType, TaskdeckError,
};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_client_creation() {
    let _client = assert_ok!(TaskServiceClient::new(JwtManager::new()));
}

#[test]
fn test_client_with_config() {
    let config = ClientConfig::default();
    let _client = assert_ok!(TaskServiceClient::with_config(config, JwtManager::new()));
}

#[test]
fn test_client_rejects_invalid_base_url() {
    let config = ClientConfig {
        base_url: "not a url".to_string(),
        ..ClientConfig::default()
    };
    let err = assert_err!(TaskServiceClient::with_config(config, JwtManager::new()));
    assert!(matches!(err, TaskdeckError::UrlParse(_)));
}

#[tokio::test]
async fn test_list_tasks_sends_bearer_token() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header("authorization", format!("Bearer {}", mock_jwt_token()).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 1,
            "tasks": [task_row("a1", "SCHEDULED", "send_message", "2026-10-17T08:00:00")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = assert_ok!(authed_client(&server).list_tasks().await);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_type, TaskType::SendMessage);
    assert_eq!(tasks[0].status, TaskStatus::Scheduled);
}

#[tokio::test]
async fn test_get_task() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks/b2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_row(
            "b2",
            "SUCCESS",
            "generate_report",
            "2026-10-17T08:00:00",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let task = assert_ok!(authed_client(&server).get_task("b2").await);
    assert!(task.report_available());
}

#[tokio::test]
async fn test_get_task_not_found() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks/zz"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "detail": "Task not found",
        })))
        .mount(&server)
        .await;

    let err = assert_err!(authed_client(&server).get_task("zz").await);
    match err {
        TaskdeckError::Api { code, message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "Task not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_snapshot_is_an_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "count": 1,
            "tasks": [task_row("a1", "PAUSED", "send_message", "2026-10-17T08:00:00")],
        })))
        .mount(&server)
        .await;

    let err = assert_err!(authed_client(&server).list_tasks().await);
    assert!(matches!(err, TaskdeckError::Serialization(_)));
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = assert_err!(authed_client(&server).list_tasks().await);
    assert!(matches!(err, TaskdeckError::RateLimit { retry_after: 7 }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_download_report_bytes() {
    let server = setup_mock_server().await;
    let pdf = b"%PDF-1.4 fake".to_vec();
    Mock::given(method("GET"))
        .and(path("/download-report/b2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(pdf.clone(), "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = assert_ok!(authed_client(&server).download_report("b2").await);
    assert_eq!(bytes, pdf);
}
