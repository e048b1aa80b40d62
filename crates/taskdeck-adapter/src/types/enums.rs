/*
[INPUT]:  Task Service schema definitions and serde requirements
[OUTPUT]: Closed task type / task status enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the backend adds a task type or a status
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    SendMessage,
    SendEmail,
    GenerateReport,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [
        TaskType::SendMessage,
        TaskType::SendEmail,
        TaskType::GenerateReport,
    ];

    /// Wire tag, e.g. `send_email`
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::SendMessage => "send_message",
            TaskType::SendEmail => "send_email",
            TaskType::GenerateReport => "generate_report",
        }
    }

    /// Human label shown in tables, e.g. `send email`
    pub fn label(&self) -> &'static str {
        match self {
            TaskType::SendMessage => "send message",
            TaskType::SendEmail => "send email",
            TaskType::GenerateReport => "generate report",
        }
    }

    /// Whether a successful run leaves a downloadable PDF behind
    pub fn produces_report(&self) -> bool {
        matches!(self, TaskType::GenerateReport)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        TaskType::ALL
            .into_iter()
            .find(|task_type| task_type.as_str() == normalized)
            .ok_or_else(|| format!("unknown task type: {s}"))
    }
}

/// Backend-owned lifecycle status.
///
/// PENDING -> SCHEDULED -> RUNNING -> {SUCCESS | FAILED}, and
/// PENDING | SCHEDULED -> CANCELLED. The client only observes transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Scheduled,
    Running,
    Success,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Pending,
        TaskStatus::Scheduled,
        TaskStatus::Running,
        TaskStatus::Success,
        TaskStatus::Failed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Scheduled => "SCHEDULED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// No further transition happens from these states
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Success | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// Only tasks that have not started yet expose a cancel action
    pub fn is_cancellable(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Scheduled)
    }

    /// Counted as "upcoming" on the dashboard
    pub fn is_upcoming(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Scheduled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown task status: {s}"))
    }
}
