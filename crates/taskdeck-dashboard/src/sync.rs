/*
[INPUT]:  TaskSource (Task Service), Session, CancellationToken, poll timings
[OUTPUT]: Fresh snapshots installed into TaskStore; refreshing indicator; sync outcomes
[POS]:    Sync layer - periodic + on-demand pulls with latest-wins install
[UPDATE]: When changing poll cadence, overlap rules, or failure policy
*/

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use taskdeck_adapter::{Result as AdapterResult, Task, TaskServiceClient};
use tokio::sync::{Notify, watch};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::store::{StoreReader, TaskStore};

/// Where full task collections come from
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch_tasks(&self) -> AdapterResult<Vec<Task>>;
}

#[async_trait]
impl TaskSource for TaskServiceClient {
    async fn fetch_tasks(&self) -> AdapterResult<Vec<Task>> {
        self.list_tasks().await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyncSettings {
    pub poll_interval: Duration,
    pub min_refresh_visible: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            min_refresh_visible: Duration::from_millis(500),
        }
    }
}

/// What a single pull did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Snapshot replaced
    Installed { generation: u64, task_count: usize },
    /// A later-issued pull was already installed; result discarded
    Superseded { generation: u64 },
    /// Not issued or not installed (overlapping tick, or shutdown)
    Skipped,
    /// Transport/server failure; previous snapshot kept
    Failed { generation: u64 },
    /// Credential missing or refused; session cleared
    LoginRequired,
}

/// Asks the running engine for an out-of-band pull
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
}

impl RefreshHandle {
    pub fn request(&self) {
        self.notify.notify_one();
    }
}

#[derive(Debug)]
struct RefreshIndicator {
    tx: watch::Sender<bool>,
    active: Mutex<usize>,
    min_visible: Duration,
}

impl RefreshIndicator {
    fn raise(self: &Arc<Self>) -> RaisedIndicator {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        *active += 1;
        if *active == 1 {
            self.tx.send_replace(true);
        }
        RaisedIndicator {
            indicator: Arc::clone(self),
            raised_at: Instant::now(),
        }
    }
}

/// Held for the duration of a background pull; lowers the indicator on drop
struct RaisedIndicator {
    indicator: Arc<RefreshIndicator>,
    raised_at: Instant,
}

impl RaisedIndicator {
    /// Keep the indicator up for at least `min_visible` to avoid flicker
    async fn settle(self) {
        tokio::time::sleep_until(self.raised_at + self.indicator.min_visible).await;
    }
}

impl Drop for RaisedIndicator {
    fn drop(&mut self) {
        let mut active = self
            .indicator
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.indicator.tx.send_replace(false);
        }
    }
}

struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct EngineInner {
    source: Arc<dyn TaskSource>,
    store: TaskStore,
    session: Session,
    settings: SyncSettings,
    next_generation: AtomicU64,
    in_flight: Arc<AtomicUsize>,
    indicator: Arc<RefreshIndicator>,
    refresh: Arc<Notify>,
    shutdown: CancellationToken,
}

/// Sole writer of the TaskStore.
///
/// Every pull takes a generation number when it is issued; its result is
/// installed only if no later-issued pull has been installed already.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<EngineInner>,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("settings", &self.inner.settings)
            .field("in_flight", &self.inner.in_flight.load(Ordering::SeqCst))
            .field("generation", &self.inner.next_generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl SyncEngine {
    pub fn new(
        source: Arc<dyn TaskSource>,
        session: Session,
        settings: SyncSettings,
        shutdown: CancellationToken,
    ) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(EngineInner {
                source,
                store: TaskStore::new(),
                session,
                settings,
                next_generation: AtomicU64::new(0),
                in_flight: Arc::new(AtomicUsize::new(0)),
                indicator: Arc::new(RefreshIndicator {
                    tx,
                    active: Mutex::new(0),
                    min_visible: settings.min_refresh_visible,
                }),
                refresh: Arc::new(Notify::new()),
                shutdown,
            }),
        }
    }

    pub fn reader(&self) -> StoreReader {
        self.inner.store.reader()
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            notify: Arc::clone(&self.inner.refresh),
        }
    }

    /// `true` while a background pull is showing the refreshing indicator
    pub fn refreshing(&self) -> watch::Receiver<bool> {
        self.inner.indicator.tx.subscribe()
    }

    pub fn is_pull_in_flight(&self) -> bool {
        self.inner.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Issue one pull now. Background pulls raise the refreshing indicator.
    pub async fn sync(&self, background: bool) -> SyncOutcome {
        let guard = InFlight::enter(&self.inner.in_flight);
        self.sync_entered(guard, background).await
    }

    async fn sync_entered(&self, guard: InFlight, background: bool) -> SyncOutcome {
        let raised = background.then(|| self.inner.indicator.raise());
        let outcome = self.pull(guard).await;
        if let Some(raised) = raised {
            raised.settle().await;
        }
        outcome
    }

    async fn pull(&self, guard: InFlight) -> SyncOutcome {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.inner.source.fetch_tasks().await;
        drop(guard);

        match result {
            Ok(_) if self.inner.shutdown.is_cancelled() => {
                debug!(generation, "engine shut down; discarding pull");
                SyncOutcome::Skipped
            }
            Ok(tasks) => {
                let task_count = tasks.len();
                if self.inner.store.install_if_newer(tasks, generation) {
                    debug!(generation, task_count, "snapshot installed");
                    SyncOutcome::Installed {
                        generation,
                        task_count,
                    }
                } else {
                    SyncOutcome::Superseded { generation }
                }
            }
            Err(err) if err.is_auth_error() => {
                warn!(generation, error = %err, "task pull rejected credential");
                self.inner.session.expire();
                SyncOutcome::LoginRequired
            }
            Err(err) => {
                warn!(
                    generation,
                    retryable = err.is_retryable(),
                    error = %err,
                    "task pull failed; keeping previous snapshot"
                );
                SyncOutcome::Failed { generation }
            }
        }
    }

    /// Drive the initial pull, the periodic timer, and refresh requests until shutdown.
    ///
    /// Stops on its own when the credential is refused. Outstanding pulls are
    /// aborted on exit.
    pub async fn run(&self) {
        let shutdown = self.inner.shutdown.clone();
        let period = self.inner.settings.poll_interval;
        let mut pulls = JoinSet::new();

        let initial = InFlight::enter(&self.inner.in_flight);
        let engine = self.clone();
        pulls.spawn(async move { engine.sync_entered(initial, false).await });

        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(poll_interval_ms = period.as_millis() as u64, "sync loop started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if self.is_pull_in_flight() {
                        debug!("previous pull still in flight; skipping tick");
                        continue;
                    }
                    let guard = InFlight::enter(&self.inner.in_flight);
                    let engine = self.clone();
                    pulls.spawn(async move { engine.sync_entered(guard, true).await });
                }
                _ = self.inner.refresh.notified() => {
                    let guard = InFlight::enter(&self.inner.in_flight);
                    let engine = self.clone();
                    pulls.spawn(async move { engine.sync_entered(guard, true).await });
                }
                Some(joined) = pulls.join_next(), if !pulls.is_empty() => {
                    match joined {
                        Ok(SyncOutcome::LoginRequired) => {
                            info!("login required; stopping sync loop");
                            break;
                        }
                        Ok(outcome) => debug!(?outcome, "pull finished"),
                        Err(err) if err.is_cancelled() => {}
                        Err(err) => warn!(error = %err, "pull task panicked"),
                    }
                }
            }
        }

        pulls.shutdown().await;
        info!("sync loop stopped");
    }
}
