/*
[INPUT]:  Public API exports for taskdeck-dashboard crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod dashboard;
pub mod gateway;
pub mod payload;
pub mod projector;
pub mod session;
pub mod store;
pub mod sync;

// Re-export main types for convenience
pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use gateway::{ActionError, ActionGateway, CancelOutcome, Confirmation, Notice, NoticeLevel};
pub use payload::{TaskForm, ValidationError};
pub use projector::{PAGE_SIZE, Projection, TaskStats, ViewState, project};
pub use session::{Session, ShellEvent};
pub use store::{Snapshot, StoreReader, TaskStore};
pub use sync::{RefreshHandle, SyncEngine, SyncOutcome, SyncSettings, TaskSource};
