/*
[INPUT]:  Task ids, schedule requests, and the bearer token
[OUTPUT]: Task snapshots, acknowledgements, CSV/PDF byte streams
[POS]:    HTTP layer - task endpoints (require bearer auth)
[UPDATE]: When adding new task endpoints or changing response format
*/

use reqwest::Method;
use serde_json::Value;

use crate::http::{Result, TaskServiceClient};
use crate::types::{
    AckResponse, ScheduleTaskRequest, ScheduleTaskResponse, Task, TaskListResponse, TaskStatus,
    TaskType,
};

impl TaskServiceClient {
    /// List every task owned by the current user
    ///
    /// GET /tasks/
    ///
    /// One row with a status or type this client does not know rejects the
    /// whole list; the offending values are logged.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let builder = self.authed_request(Method::GET, "/tasks/")?;
        let body = self.send_bytes(builder).await?;
        match serde_json::from_slice::<TaskListResponse>(&body) {
            Ok(response) => Ok(response.tasks),
            Err(err) => {
                for unknown in unrecognised_values(&body) {
                    tracing::warn!(
                        task_id = %unknown.task_id,
                        field = unknown.field,
                        value = %unknown.value,
                        "task row carries an unrecognised value"
                    );
                }
                Err(err.into())
            }
        }
    }

    /// Fetch a single task
    ///
    /// GET /tasks/{id}
    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        let builder = self.authed_segments_request(Method::GET, &["tasks", task_id])?;
        self.send_json(builder).await
    }

    /// Schedule a new task
    ///
    /// POST /schedule-task/
    pub async fn schedule_task(&self, req: &ScheduleTaskRequest) -> Result<ScheduleTaskResponse> {
        let builder = self.authed_request(Method::POST, "/schedule-task/")?;
        self.send_json(builder.json(req)).await
    }

    /// Request cancellation; the status only changes once a later pull shows it
    ///
    /// POST /tasks/{id}/cancel
    pub async fn cancel_task(&self, task_id: &str) -> Result<AckResponse> {
        let builder =
            self.authed_segments_request(Method::POST, &["tasks", task_id, "cancel"])?;
        self.send_json(builder).await
    }

    /// Export the whole collection as CSV
    ///
    /// GET /tasks/export_csv
    pub async fn export_csv(&self) -> Result<Vec<u8>> {
        let builder = self.authed_request(Method::GET, "/tasks/export_csv")?;
        self.send_bytes(builder).await
    }

    /// Download the rendered PDF of a finished report task
    ///
    /// GET /download-report/{id}
    pub async fn download_report(&self, task_id: &str) -> Result<Vec<u8>> {
        let builder =
            self.authed_segments_request(Method::GET, &["download-report", task_id])?;
        self.send_bytes(builder).await
    }
}

/// Enum field in a list row that no known variant matches
#[derive(Debug, PartialEq, Eq)]
struct UnknownValue {
    task_id: String,
    field: &'static str,
    value: String,
}

fn unrecognised_values(body: &[u8]) -> Vec<UnknownValue> {
    let Ok(list) = serde_json::from_slice::<Value>(body) else {
        return Vec::new();
    };
    let Some(rows) = list.get("tasks").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut unknown = Vec::new();
    for row in rows {
        let task_id = row
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<missing id>")
            .to_string();

        let status = row.get("status").and_then(Value::as_str);
        if let Some(status) =
            status.filter(|v| !TaskStatus::ALL.iter().any(|k| k.as_str() == *v))
        {
            unknown.push(UnknownValue {
                task_id: task_id.clone(),
                field: "status",
                value: status.to_string(),
            });
        }
        let task_type = row.get("task_type").and_then(Value::as_str);
        if let Some(task_type) =
            task_type.filter(|v| !TaskType::ALL.iter().any(|k| k.as_str() == *v))
        {
            unknown.push(UnknownValue {
                task_id,
                field: "task_type",
                value: task_type.to_string(),
            });
        }
    }
    unknown
}
