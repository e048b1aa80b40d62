/*
[INPUT]:  DashboardConfig (or prebuilt client + task source for tests)
[OUTPUT]: Wired session, store reader, sync engine and action gateway; engine lifecycle
[POS]:    Composition root - owns startup and teardown of the live core
[UPDATE]: When adding components or changing shutdown guarantees
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use taskdeck_adapter::{AuthManager, CredentialStore, JwtManager, TaskServiceClient};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::DashboardConfig;
use crate::gateway::{ActionGateway, Notice};
use crate::session::Session;
use crate::store::StoreReader;
use crate::sync::{SyncEngine, SyncSettings, TaskSource};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything one dashboard view needs, with an explicit lifetime
#[derive(Debug)]
pub struct Dashboard {
    session: Session,
    engine: SyncEngine,
    gateway: ActionGateway,
    notices: Option<mpsc::UnboundedReceiver<Notice>>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Dashboard {
    /// Build against the configured Task Service, restoring any persisted credential
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let client = TaskServiceClient::with_config(config.client_config(), JwtManager::new())
            .context("build task service client")?;
        let auth = AuthManager::new(
            client.clone(),
            CredentialStore::new(&config.credential_path),
        );
        let session = Session::restore(auth).context("restore credential")?;
        let settings = SyncSettings {
            poll_interval: config.poll_interval(),
            min_refresh_visible: config.min_refresh_visible(),
        };
        Ok(Self::with_source(
            client.clone(),
            Arc::new(client),
            session,
            settings,
        ))
    }

    /// Build with an explicit task source; the client still carries the write path
    pub fn with_source(
        client: TaskServiceClient,
        source: Arc<dyn TaskSource>,
        session: Session,
        settings: SyncSettings,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let engine = SyncEngine::new(source, session.clone(), settings, shutdown.clone());
        let (gateway, notices) = ActionGateway::new(
            client,
            engine.reader(),
            session.clone(),
            engine.refresh_handle(),
        );

        Self {
            session,
            engine,
            gateway,
            notices: Some(notices),
            shutdown,
            handle: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn gateway(&self) -> &ActionGateway {
        &self.gateway
    }

    pub fn reader(&self) -> StoreReader {
        self.engine.reader()
    }

    /// Notice stream; can be taken once
    pub fn take_notices(&mut self) -> Option<mpsc::UnboundedReceiver<Notice>> {
        self.notices.take()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawn the sync loop. Calling twice is a no-op.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let engine = self.engine.clone();
        self.handle = Some(tokio::spawn(async move { engine.run().await }));
        info!("dashboard started");
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the timer and outstanding pulls; no store writes happen afterwards
    pub async fn shutdown_and_wait(&mut self) -> Result<()> {
        self.shutdown.cancel();
        let Some(mut handle) = self.handle.take() else {
            return Ok(());
        };

        tokio::select! {
            res = &mut handle => {
                res.map_err(|err| anyhow!("sync loop join error: {err}"))?;
            }
            _ = tokio::time::sleep(SHUTDOWN_TIMEOUT) => {
                handle.abort();
                return Err(anyhow!("shutdown timed out after {SHUTDOWN_TIMEOUT:?}"));
            }
        }
        info!("dashboard stopped");
        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config_for(dir: &PathBuf) -> DashboardConfig {
        DashboardConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            credential_path: dir.join("token"),
            download_dir: dir.clone(),
            ..DashboardConfig::default()
        }
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("taskdeck-dash-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_from_config_restores_session() {
        let dir = temp_dir();
        std::fs::write(dir.join("token"), "opaque-token").unwrap();

        let mut dashboard = Dashboard::from_config(&config_for(&dir)).unwrap();
        assert!(dashboard.session().is_authenticated());
        assert!(dashboard.take_notices().is_some());
        assert!(dashboard.take_notices().is_none());
    }

    #[tokio::test]
    async fn test_start_then_shutdown() {
        let dir = temp_dir();
        let mut dashboard = Dashboard::from_config(&config_for(&dir)).unwrap();

        dashboard.start();
        dashboard.start();
        dashboard.shutdown_and_wait().await.unwrap();

        assert!(!dashboard.is_running());
        assert!(dashboard.shutdown_token().is_cancelled());
    }
}
