/*
[INPUT]:  Task lists pulled by the SyncEngine, tagged with their issue generation
[OUTPUT]: Immutable snapshots shared with readers through a watch channel
[POS]:    State layer - single-writer task snapshot store
[UPDATE]: When snapshot contents or install rules change
*/

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use taskdeck_adapter::Task;
use tokio::sync::watch;
use tracing::{debug, warn};

/// One authoritative view of the task collection, replaced wholesale on every install
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    tasks: Vec<Task>,
    index: HashMap<String, usize>,
    last_updated: Option<DateTime<Utc>>,
    generation: u64,
}

impl Snapshot {
    /// Empty snapshot at generation 0, before the first pull lands
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_pull(pulled: Vec<Task>, generation: u64, fetched_at: DateTime<Utc>) -> Self {
        let mut tasks = Vec::with_capacity(pulled.len());
        let mut index = HashMap::with_capacity(pulled.len());

        for task in pulled {
            if index.contains_key(&task.id) {
                warn!(task_id = %task.id, generation, "duplicate task id in pull; keeping first");
                continue;
            }
            index.insert(task.id.clone(), tasks.len());
            tasks.push(task);
        }

        Self {
            tasks,
            index,
            last_updated: Some(fetched_at),
            generation,
        }
    }

    /// Tasks in the order the backend returned them
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.index.get(id).map(|&pos| &self.tasks[pos])
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// When the installed pull completed; `None` until the first install
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Writer half. Owned by the SyncEngine; nothing else installs snapshots.
#[derive(Debug)]
pub struct TaskStore {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Snapshot::empty()));
        Self { tx }
    }

    pub fn reader(&self) -> StoreReader {
        StoreReader {
            rx: self.tx.subscribe(),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.tx.borrow().clone()
    }

    /// Replace the snapshot if `generation` is newer than the installed one.
    ///
    /// Returns `false` (store untouched) for a pull that was issued before the
    /// one already installed.
    pub fn install_if_newer(&self, tasks: Vec<Task>, generation: u64) -> bool {
        self.tx.send_if_modified(|current| {
            if generation <= current.generation {
                debug!(
                    generation,
                    installed = current.generation,
                    "dropping stale pull"
                );
                return false;
            }
            *current = Arc::new(Snapshot::from_pull(tasks, generation, Utc::now()));
            true
        })
    }
}

/// Read handle; clone freely
#[derive(Debug, Clone)]
pub struct StoreReader {
    rx: watch::Receiver<Arc<Snapshot>>,
}

impl StoreReader {
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.rx.borrow().clone()
    }

    /// Wait for the next install. Errors once the writer is gone.
    pub async fn changed(&mut self) -> Result<Arc<Snapshot>, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Current status-driven cancel eligibility for `id`
    pub fn can_cancel(&self, id: &str) -> bool {
        self.rx.borrow().get(id).is_some_and(Task::can_cancel)
    }
}
