/*
[INPUT]:  Task Service schema definitions and serde requirements
[OUTPUT]: Typed Task entity with type-shaped payloads
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
[UPDATE]: Payload shapes are keyed by task_type; mismatched rows stay displayable
*/

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{TaskStatus, TaskType};

/// Retry ceiling applied by the backend executor
pub const MAX_RETRIES: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPayload {
    pub to: String,
    pub subject: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub title: String,
    pub content: String,
}

/// Creation payload, shaped by the task type.
///
/// `Unstructured` only appears on ingested rows whose payload does not match
/// the declared type; the payload builder never produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskPayload {
    Message(String),
    Email(EmailPayload),
    Report(ReportPayload),
    Unstructured(Value),
}

impl TaskPayload {
    /// Shape a raw wire payload according to the task type
    pub fn from_wire(task_type: TaskType, value: Value) -> Self {
        match task_type {
            TaskType::SendMessage => match value {
                Value::String(text) => TaskPayload::Message(text),
                other => TaskPayload::Unstructured(other),
            },
            TaskType::SendEmail => match serde_json::from_value::<EmailPayload>(value.clone()) {
                Ok(email) => TaskPayload::Email(email),
                Err(_) => TaskPayload::Unstructured(value),
            },
            TaskType::GenerateReport => {
                match serde_json::from_value::<ReportPayload>(value.clone()) {
                    Ok(report) => TaskPayload::Report(report),
                    Err(_) => TaskPayload::Unstructured(value),
                }
            }
        }
    }

    /// Whether the payload shape belongs to the given task type
    pub fn fits(&self, task_type: TaskType) -> bool {
        matches!(
            (self, task_type),
            (TaskPayload::Message(_), TaskType::SendMessage)
                | (TaskPayload::Email(_), TaskType::SendEmail)
                | (TaskPayload::Report(_), TaskType::GenerateReport)
        )
    }

    /// Single-line rendering for a table cell
    pub fn summary(&self) -> String {
        match self {
            TaskPayload::Message(text) => text.clone(),
            TaskPayload::Unstructured(Value::String(text)) => text.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

/// Execution result; only meaningful once the task is terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskResult {
    Text(String),
    Structured(Map<String, Value>),
}

impl TaskResult {
    fn from_wire(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(TaskResult::Text(text)),
            Value::Object(map) => Some(TaskResult::Structured(map)),
            other => Some(TaskResult::Text(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTask")]
pub struct Task {
    pub id: String,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub payload: TaskPayload,
    pub result: Option<TaskResult>,
    pub error_message: Option<String>,
    pub logs: Option<String>,
    #[serde(serialize_with = "serde_helpers::serialize_timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(serialize_with = "serde_helpers::serialize_timestamp")]
    pub run_at: NaiveDateTime,
    #[serde(serialize_with = "serde_helpers::serialize_optional_timestamp")]
    pub completed_at: Option<NaiveDateTime>,
    pub retries: u8,
}

impl Task {
    /// Case-insensitive substring match against type tag, status, or id.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.task_type.as_str().contains(needle)
            || self.status.as_str().to_ascii_lowercase().contains(needle)
            || self.id.to_lowercase().contains(needle)
    }

    pub fn can_cancel(&self) -> bool {
        self.status.is_cancellable()
    }

    /// A rendered PDF exists only for successful report tasks
    pub fn report_available(&self) -> bool {
        self.task_type.produces_report() && self.status == TaskStatus::Success
    }

    pub fn retries_remaining(&self) -> u8 {
        MAX_RETRIES.saturating_sub(self.retries)
    }

    /// Logs text, or the placeholder the dashboard shows for empty logs
    pub fn logs_or_placeholder(&self) -> &str {
        match self.logs.as_deref() {
            Some(logs) if !logs.trim().is_empty() => logs,
            _ => "No logs available...",
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTask {
    id: String,
    task_type: TaskType,
    status: TaskStatus,
    #[serde(default)]
    payload: Value,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    logs: Option<String>,
    #[serde(deserialize_with = "serde_helpers::deserialize_timestamp")]
    created_at: NaiveDateTime,
    #[serde(deserialize_with = "serde_helpers::deserialize_timestamp")]
    run_at: NaiveDateTime,
    #[serde(default, deserialize_with = "serde_helpers::deserialize_optional_timestamp")]
    completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    retries: Option<u32>,
}

impl TryFrom<RawTask> for Task {
    type Error = String;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err("task id must not be empty".to_string());
        }

        let retries = raw.retries.unwrap_or(0).min(u32::from(MAX_RETRIES)) as u8;

        Ok(Task {
            payload: TaskPayload::from_wire(raw.task_type, raw.payload),
            result: TaskResult::from_wire(raw.result),
            id: raw.id,
            task_type: raw.task_type,
            status: raw.status,
            error_message: raw.error_message,
            logs: raw.logs,
            created_at: raw.created_at,
            run_at: raw.run_at,
            completed_at: raw.completed_at,
            retries,
        })
    }
}

/// Parse a backend timestamp.
///
/// Accepts naive ISO-8601 (what the backend emits), RFC 3339 with an offset
/// (normalized to UTC), and the `YYYY-MM-DD HH:MM[:SS]` wire form.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let raw = raw.trim();
    if let Ok(with_offset) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

mod serde_helpers {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_optional_timestamp<'de, D>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
        }
    }

    pub fn serialize_timestamp<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(ISO_FORMAT).to_string())
    }

    pub fn serialize_optional_timestamp<S>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serialize_timestamp(value, serializer),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn email_row() -> Value {
        json!({
            "id": "a1",
            "status": "SUCCESS",
            "task_type": "send_email",
            "payload": {"to": "ops@example.com", "subject": "Hi", "content": "Body"},
            "retries": 1,
            "result": "sent",
            "error_message": null,
            "run_at": "2026-10-17T09:30:00",
            "created_at": "2026-10-17T09:00:12.345678",
            "completed_at": "2026-10-17T09:30:04.100000",
            "logs": "[09:30:00] Task Started\n"
        })
    }

    #[test]
    fn test_task_deserialize_backend_row() {
        let task: Task = serde_json::from_value(email_row()).unwrap();

        assert_eq!(task.id, "a1");
        assert_eq!(task.task_type, TaskType::SendEmail);
        assert_eq!(task.status, TaskStatus::Success);
        assert_eq!(
            task.payload,
            TaskPayload::Email(EmailPayload {
                to: "ops@example.com".to_string(),
                subject: "Hi".to_string(),
                content: "Body".to_string(),
            })
        );
        assert_eq!(task.result, Some(TaskResult::Text("sent".to_string())));
        assert_eq!(task.retries, 1);
        assert_eq!(task.retries_remaining(), 2);
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn test_message_payload_is_bare_string() {
        let mut row = email_row();
        row["task_type"] = json!("send_message");
        row["payload"] = json!("hello team");
        row["completed_at"] = Value::Null;

        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.payload, TaskPayload::Message("hello team".to_string()));
        assert_eq!(task.payload.summary(), "hello team");
        assert_eq!(task.completed_at, None);
    }

    #[test]
    fn test_mismatched_payload_stays_displayable() {
        let mut row = email_row();
        row["task_type"] = json!("generate_report");
        row["payload"] = json!({"unexpected": true});

        let task: Task = serde_json::from_value(row).unwrap();
        assert!(matches!(task.payload, TaskPayload::Unstructured(_)));
        assert!(!task.payload.fits(TaskType::GenerateReport));
        assert_eq!(task.payload.summary(), r#"{"unexpected":true}"#);
    }

    #[test]
    fn test_structured_result() {
        let mut row = email_row();
        row["result"] = json!({"pages": 3});

        let task: Task = serde_json::from_value(row).unwrap();
        match task.result {
            Some(TaskResult::Structured(map)) => assert_eq!(map["pages"], json!(3)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_retries_clamped_to_ceiling() {
        let mut row = email_row();
        row["retries"] = json!(9);
        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.retries, MAX_RETRIES);
        assert_eq!(task.retries_remaining(), 0);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let mut row = email_row();
        row["status"] = json!("PAUSED");
        assert!(serde_json::from_value::<Task>(row).is_err());
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = NaiveDateTime::parse_from_str("2026-10-17 09:30", "%Y-%m-%d %H:%M").unwrap();
        assert_eq!(parse_timestamp("2026-10-17T09:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-17 09:30"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-17T09:30"), Some(expected));
        assert_eq!(parse_timestamp("2026-10-17T11:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_matches_search_fields() {
        let task: Task = serde_json::from_value(email_row()).unwrap();
        assert!(task.matches_search("succ"));
        assert!(task.matches_search("email"));
        assert!(task.matches_search("a1"));
        assert!(task.matches_search(""));
        assert!(!task.matches_search("report"));
    }

    #[test]
    fn test_report_available_only_for_successful_reports() {
        let mut row = email_row();
        row["task_type"] = json!("generate_report");
        row["payload"] = json!({"title": "Q1", "content": "numbers"});
        let task: Task = serde_json::from_value(row.clone()).unwrap();
        assert!(task.report_available());

        row["status"] = json!("RUNNING");
        let task: Task = serde_json::from_value(row).unwrap();
        assert!(!task.report_available());
    }
}
