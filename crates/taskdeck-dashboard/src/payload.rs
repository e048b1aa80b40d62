/*
[INPUT]:  Creation form fields (task type, run time, type-specific fields)
[OUTPUT]: Validated ScheduleTaskRequest or ValidationError
[POS]:    Payload layer - shapes task-type-specific creation payloads
[UPDATE]: When a task type is added or its payload shape changes
*/

use chrono::NaiveDateTime;
use taskdeck_adapter::{EmailPayload, ReportPayload, ScheduleTaskRequest, TaskPayload, TaskType};
use thiserror::Error;

/// Canonical wire form for `run_at`
pub const RUN_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

const RUN_AT_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid run time '{0}', expected YYYY-MM-DD HH:MM")]
    InvalidRunAt(String),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// Raw creation form state. Fields not used by the selected type are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub task_type: TaskType,
    pub run_at: String,
    pub message: String,
    pub to: String,
    pub subject: String,
    pub content: String,
    pub report_title: String,
    pub report_content: String,
}

impl TaskForm {
    pub fn new(task_type: TaskType) -> Self {
        Self {
            task_type,
            run_at: String::new(),
            message: String::new(),
            to: String::new(),
            subject: String::new(),
            content: String::new(),
            report_title: String::new(),
            report_content: String::new(),
        }
    }

    /// Reset after a successful submit; the selected type stays
    pub fn clear(&mut self) {
        *self = Self::new(self.task_type);
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new(TaskType::SendMessage)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Shape the payload for `form.task_type`
pub fn build_payload(form: &TaskForm) -> Result<TaskPayload, ValidationError> {
    let payload = match form.task_type {
        TaskType::SendMessage => TaskPayload::Message(required(&form.message, "message")?),
        TaskType::SendEmail => {
            let to = required(&form.to, "to")?;
            if !to.contains('@') {
                return Err(ValidationError::InvalidEmail(to));
            }
            TaskPayload::Email(EmailPayload {
                to,
                subject: required(&form.subject, "subject")?,
                content: required(&form.content, "content")?,
            })
        }
        TaskType::GenerateReport => TaskPayload::Report(ReportPayload {
            title: required(&form.report_title, "title")?,
            content: required(&form.report_content, "content")?,
        }),
    };
    Ok(payload)
}

/// Parse a date-time control value (`YYYY-MM-DDTHH:MM`) or the wire form.
///
/// The value is a naive wall-clock time; no timezone conversion happens.
pub fn parse_run_at(raw: &str) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("run_at"));
    }
    RUN_AT_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ValidationError::InvalidRunAt(raw.to_string()))
}

pub fn format_run_at(run_at: &NaiveDateTime) -> String {
    run_at.format(RUN_AT_FORMAT).to_string()
}

/// Validate the whole form and produce the request body
pub fn build_request(form: &TaskForm) -> Result<ScheduleTaskRequest, ValidationError> {
    let run_at = parse_run_at(&form.run_at)?;
    let payload = build_payload(form)?;
    Ok(ScheduleTaskRequest {
        task_type: form.task_type,
        run_at: format_run_at(&run_at),
        payload,
    })
}
