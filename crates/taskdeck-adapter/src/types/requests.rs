/*
[INPUT]:  Validated creation fields and auth form input
[OUTPUT]: Typed Rust request structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::enums::TaskType;
use super::models::TaskPayload;

/// Body of `POST /schedule-task/`.
///
/// `run_at` is already in the `YYYY-MM-DD HH:MM` wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTaskRequest {
    pub task_type: TaskType,
    pub run_at: String,
    pub payload: TaskPayload,
}

/// Form-encoded body of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// JSON body of `POST /auth/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}
