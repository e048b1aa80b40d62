/*
[INPUT]:  Task Service client, store read handle, session, refresh handle, operator confirmations
[OUTPUT]: Create / cancel / export / report mutations, user-visible notices, re-pull requests
[POS]:    Action layer - write path against the Task Service
[UPDATE]: When adding operator actions or changing their feedback
*/

use std::path::{Path, PathBuf};

use taskdeck_adapter::{ScheduleTaskResponse, Task, TaskServiceClient, TaskdeckError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::payload::{TaskForm, ValidationError, build_request};
use crate::session::Session;
use crate::store::StoreReader;
use crate::sync::RefreshHandle;

pub const CSV_EXPORT_FILE: &str = "tasks_export.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient operator feedback. Never implies a state change by itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Explicit operator consent for destructive actions
pub trait Confirmation: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("session expired, please log in again")]
    Auth(#[source] TaskdeckError),
    #[error("{0}")]
    Write(#[source] TaskdeckError),
    #[error("task {0} cannot be cancelled in its current state")]
    NotCancellable(String),
    #[error("no report available for task {0}")]
    ReportUnavailable(String),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Request accepted by the backend; the next pull shows the real status
    Requested,
    /// Operator said no; nothing sent
    Declined,
}

/// Performs operator mutations. Reads the store, never writes it.
#[derive(Debug, Clone)]
pub struct ActionGateway {
    client: TaskServiceClient,
    store: StoreReader,
    session: Session,
    refresh: RefreshHandle,
    notices: mpsc::UnboundedSender<Notice>,
}

impl ActionGateway {
    pub fn new(
        client: TaskServiceClient,
        store: StoreReader,
        session: Session,
        refresh: RefreshHandle,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                store,
                session,
                refresh,
                notices,
            },
            rx,
        )
    }

    fn notify(&self, level: NoticeLevel, message: impl Into<String>) {
        // receiver may be gone during teardown
        let _ = self.notices.send(Notice {
            level,
            message: message.into(),
        });
    }

    fn fail(&self, err: ActionError) -> ActionError {
        self.notify(NoticeLevel::Error, err.to_string());
        err
    }

    fn remote_failure(&self, err: TaskdeckError) -> ActionError {
        if err.is_auth_error() {
            self.session.expire();
            return self.fail(ActionError::Auth(err));
        }
        warn!(error = %err, "task service rejected action");
        self.fail(ActionError::Write(err))
    }

    /// Validate and submit the form.
    ///
    /// The form is cleared only after the backend accepts it; on any failure
    /// the entered values stay for resubmission.
    pub async fn create(&self, form: &mut TaskForm) -> Result<ScheduleTaskResponse, ActionError> {
        let request = build_request(form).map_err(|err| self.fail(err.into()))?;

        let response = self
            .client
            .schedule_task(&request)
            .await
            .map_err(|err| self.remote_failure(err))?;

        info!(
            task_id = %response.task_id,
            task_type = %request.task_type,
            run_at = %request.run_at,
            "task scheduled"
        );
        form.clear();
        self.notify(
            NoticeLevel::Success,
            format!("Task scheduled successfully ({})", response.task_id),
        );
        self.refresh.request();
        Ok(response)
    }

    /// Whether the cancel control should be offered, from the installed snapshot
    pub fn can_cancel(&self, task_id: &str) -> bool {
        self.store.can_cancel(task_id)
    }

    /// Ask the backend to cancel `task_id` after the operator confirms.
    ///
    /// The store is not touched; the status changes when a later pull says so.
    pub async fn cancel(
        &self,
        task_id: &str,
        confirmation: &dyn Confirmation,
    ) -> Result<CancelOutcome, ActionError> {
        if !self.can_cancel(task_id) {
            return Err(self.fail(ActionError::NotCancellable(task_id.to_string())));
        }
        if !confirmation.confirm(&format!("Are you sure you want to cancel task {task_id}?")) {
            self.notify(NoticeLevel::Info, format!("Cancel of task {task_id} aborted"));
            return Ok(CancelOutcome::Declined);
        }

        let ack = self
            .client
            .cancel_task(task_id)
            .await
            .map_err(|err| self.remote_failure(err))?;

        info!(task_id = %task_id, "cancel requested");
        let message = if ack.message.is_empty() {
            format!("Cancel requested for task {task_id}")
        } else {
            ack.message
        };
        self.notify(NoticeLevel::Success, message);
        self.refresh.request();
        Ok(CancelOutcome::Requested)
    }

    /// Download the CSV of the whole collection into `dir`
    pub async fn export_csv(&self, dir: &Path) -> Result<PathBuf, ActionError> {
        let bytes = self
            .client
            .export_csv()
            .await
            .map_err(|err| self.remote_failure(err))?;

        let path = dir.join(CSV_EXPORT_FILE);
        self.write_file(&path, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "csv exported");
        self.notify(
            NoticeLevel::Success,
            format!("Exported to {}", path.display()),
        );
        Ok(path)
    }

    /// Download the PDF of a successful report task into `dir`
    pub async fn download_report(&self, task_id: &str, dir: &Path) -> Result<PathBuf, ActionError> {
        let available = self
            .store
            .snapshot()
            .get(task_id)
            .is_some_and(Task::report_available);
        if !available {
            return Err(self.fail(ActionError::ReportUnavailable(task_id.to_string())));
        }

        let bytes = self
            .client
            .download_report(task_id)
            .await
            .map_err(|err| self.remote_failure(err))?;

        let path = dir.join(report_file_name(task_id));
        self.write_file(&path, &bytes).await?;
        info!(task_id = %task_id, path = %path.display(), "report downloaded");
        self.notify(
            NoticeLevel::Success,
            format!("Report saved to {}", path.display()),
        );
        Ok(path)
    }

    /// Fetch one task for the detail view. Does not touch the store.
    pub async fn task_detail(&self, task_id: &str) -> Result<Task, ActionError> {
        self.client
            .get_task(task_id)
            .await
            .map_err(|err| self.remote_failure(err))
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<(), ActionError> {
        let io_err = |source| ActionError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| self.fail(io_err(err)))?;
        }
        tokio::fs::write(path, bytes)
            .await
            .map_err(|err| self.fail(io_err(err)))
    }
}

fn report_file_name(task_id: &str) -> String {
    let safe: String = task_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("report_{safe}.pdf")
}
