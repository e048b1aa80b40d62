/*
[INPUT]:  AuthManager (JWT holder + credential file)
[OUTPUT]: Process-scoped session state and shell events (login required)
[POS]:    Session layer - shared by SyncEngine and ActionGateway
[UPDATE]: When credential lifecycle or shell signalling changes
*/

use taskdeck_adapter::{AuthManager, JwtManager, Result as AdapterResult};
use tokio::sync::broadcast;
use tracing::{info, warn};

const SHELL_EVENT_CAPACITY: usize = 16;

/// Signals from the core to whatever hosts it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    /// Credential was rejected or missing; the host should show the login surface
    LoginRequired,
}

/// Explicit credential state, passed to every component that talks to the backend.
///
/// Starts unauthenticated unless a persisted token is restored; cleared on
/// logout or when the backend rejects the token.
#[derive(Debug, Clone)]
pub struct Session {
    auth: AuthManager,
    events: broadcast::Sender<ShellEvent>,
}

impl Session {
    pub fn new(auth: AuthManager) -> Self {
        let (events, _) = broadcast::channel(SHELL_EVENT_CAPACITY);
        Self { auth, events }
    }

    /// Build a session and load any persisted token
    pub fn restore(auth: AuthManager) -> AdapterResult<Self> {
        let session = Self::new(auth);
        if session.auth.restore()? {
            info!(
                path = %session.auth.credential_store().path().display(),
                "restored persisted credential"
            );
        }
        Ok(session)
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn jwt_manager(&self) -> &JwtManager {
        self.auth.jwt_manager()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.jwt_manager().is_expired()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }

    /// Drop the credential after the backend refused it and ask the shell for a login
    pub fn expire(&self) {
        if let Err(err) = self.auth.logout() {
            warn!(error = %err, "failed to erase persisted credential");
        }
        info!("credential rejected; login required");
        // no subscribers is fine
        let _ = self.events.send(ShellEvent::LoginRequired);
    }

    /// Operator-initiated logout; no shell event
    pub fn logout(&self) -> AdapterResult<()> {
        self.auth.logout()?;
        info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use taskdeck_adapter::{CredentialStore, TaskServiceClient};

    fn auth_in(dir: &PathBuf) -> AuthManager {
        let client = TaskServiceClient::new(JwtManager::new()).unwrap();
        AuthManager::new(client, CredentialStore::new(dir.join("token")))
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("taskdeck-session-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_starts_unauthenticated() {
        let dir = temp_dir();
        let session = Session::restore(auth_in(&dir)).unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_loads_persisted_token() {
        let dir = temp_dir();
        std::fs::write(dir.join("token"), "opaque-token").unwrap();

        let session = Session::restore(auth_in(&dir)).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.jwt_manager().get_token().as_deref(), Some("opaque-token"));
    }

    #[tokio::test]
    async fn test_expire_erases_and_signals() {
        let dir = temp_dir();
        std::fs::write(dir.join("token"), "opaque-token").unwrap();
        let session = Session::restore(auth_in(&dir)).unwrap();
        let mut events = session.subscribe();

        session.expire();

        assert!(!session.is_authenticated());
        assert!(!dir.join("token").exists());
        assert_eq!(events.recv().await.unwrap(), ShellEvent::LoginRequired);
    }

    #[test]
    fn test_logout_sends_no_event() {
        let dir = temp_dir();
        std::fs::write(dir.join("token"), "opaque-token").unwrap();
        let session = Session::restore(auth_in(&dir)).unwrap();
        let mut events = session.subscribe();

        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert!(events.try_recv().is_err());
    }
}
