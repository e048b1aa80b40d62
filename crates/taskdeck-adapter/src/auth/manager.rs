/*
[INPUT]:  Task Service client and credential store
[OUTPUT]: Logged-in session (bearer token held and persisted)
[POS]:    Auth layer - orchestrates login, registration, restore and logout
[UPDATE]: When auth endpoints or flow steps change
*/

use reqwest::Method;

use crate::http::{Result, TaskServiceClient};
use crate::types::{AckResponse, LoginForm, LoginResponse, RegisterRequest};

use super::{CredentialStore, JwtManager};

/// Manages the complete authentication flow
#[derive(Debug, Clone)]
pub struct AuthManager {
    client: TaskServiceClient,
    store: CredentialStore,
}

impl AuthManager {
    pub fn new(client: TaskServiceClient, store: CredentialStore) -> Self {
        Self { client, store }
    }

    /// Get the JWT manager shared with the client
    pub fn jwt_manager(&self) -> &JwtManager {
        self.client.jwt_manager()
    }

    pub fn credential_store(&self) -> &CredentialStore {
        &self.store
    }

    /// Exchange username/password for a bearer token, then hold and persist it
    ///
    /// POST /auth/login (form-encoded)
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };

        let builder = self.client.request(Method::POST, "/auth/login")?;
        let response: LoginResponse = self.client.send_json(builder.form(&form)).await?;

        self.jwt_manager().set_token(response.access_token.clone());
        self.store.save(&response.access_token)?;
        tracing::info!(username = %username, "logged in");

        Ok(response)
    }

    /// Create an account; does not log in
    ///
    /// POST /auth/register
    pub async fn register(&self, email: &str, password: &str) -> Result<AckResponse> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let builder = self.client.request(Method::POST, "/auth/register")?;
        self.client.send_json(builder.json(&body)).await
    }

    /// Load a persisted token into the session.
    ///
    /// Returns `true` when a usable token was restored; an expired token is
    /// erased instead.
    pub fn restore(&self) -> Result<bool> {
        let Some(token) = self.store.load()? else {
            return Ok(false);
        };

        self.jwt_manager().set_token(token);
        if self.jwt_manager().is_expired() {
            tracing::info!("persisted token expired; erasing");
            self.logout()?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Drop the held token and the persisted copy
    pub fn logout(&self) -> Result<()> {
        self.jwt_manager().clear();
        self.store.erase()?;
        Ok(())
    }
}
