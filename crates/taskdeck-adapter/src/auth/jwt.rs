/*
[INPUT]:  Bearer tokens issued by the Auth Service
[OUTPUT]: Token retrieval, decoded claims, and expiration status
[POS]:    Auth layer - token lifecycle management
[UPDATE]: When adding token refresh or changing storage strategy
*/

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Utc};

/// Stored token data with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenData {
    pub token: String,
    /// `exp` claim; `None` when the token carries no decodable expiry
    pub expires_at: Option<DateTime<Utc>>,
    /// `sub` claim (backend user id)
    pub subject: Option<String>,
}

/// Thread-safe bearer token holder shared by every request path
#[derive(Debug, Clone, Default)]
pub struct JwtManager {
    data: Arc<RwLock<Option<TokenData>>>,
}

impl JwtManager {
    /// Create a new empty JWT manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new token, decoding its claims without verifying the signature
    pub fn set_token(&self, token: String) {
        let claims = decode_claims(&token);
        let expires_at = claims
            .as_ref()
            .and_then(|claims| claims.get("exp"))
            .and_then(serde_json::Value::as_i64)
            .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0));
        let subject = claims
            .as_ref()
            .and_then(|claims| claims.get("sub"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);

        *self.write() = Some(TokenData {
            token,
            expires_at,
            subject,
        });
    }

    /// Get the current token if available
    pub fn get_token(&self) -> Option<String> {
        self.read().as_ref().map(|data| data.token.clone())
    }

    /// True when no token is held or its `exp` has passed
    pub fn is_expired(&self) -> bool {
        match self.read().as_ref() {
            Some(data) => data
                .expires_at
                .is_some_and(|expires_at| Utc::now() > expires_at),
            None => true,
        }
    }

    /// Get token data if available
    pub fn token_data(&self) -> Option<TokenData> {
        self.read().clone()
    }

    /// Clear the stored token
    pub fn clear(&self) {
        *self.write() = None;
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<TokenData>> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<TokenData>> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn decode_claims(token: &str) -> Option<serde_json::Value> {
    let payload_b64 = token.trim().split('.').nth(1)?;
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| URL_SAFE.decode(payload_b64))
        .ok()?;
    serde_json::from_slice(&payload_bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_jwt(claims: serde_json::Value) -> String {
        let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        format!("{header_b64}.{payload_b64}.signature")
    }

    #[test]
    fn test_new_manager_is_empty() {
        let manager = JwtManager::new();
        assert!(manager.get_token().is_none());
        assert!(manager.is_expired());
    }

    #[test]
    fn test_set_and_get_token_with_claims() {
        let exp = (Utc::now() + chrono::Duration::minutes(60)).timestamp();
        let token = make_test_jwt(serde_json::json!({"sub": "user-1", "exp": exp}));

        let manager = JwtManager::new();
        manager.set_token(token.clone());

        assert_eq!(manager.get_token(), Some(token));
        assert!(!manager.is_expired());
        let data = manager.token_data().unwrap();
        assert_eq!(data.subject.as_deref(), Some("user-1"));
        assert_eq!(data.expires_at.map(|at| at.timestamp()), Some(exp));
    }

    #[test]
    fn test_expired_claim() {
        let exp = (Utc::now() - chrono::Duration::minutes(1)).timestamp();
        let manager = JwtManager::new();
        manager.set_token(make_test_jwt(serde_json::json!({"exp": exp})));
        assert!(manager.is_expired());
    }

    #[test]
    fn test_opaque_token_never_expires_locally() {
        let manager = JwtManager::new();
        manager.set_token("opaque-token".to_string());
        assert!(!manager.is_expired());
        assert_eq!(manager.token_data().unwrap().expires_at, None);
    }

    #[test]
    fn test_clear_token() {
        let manager = JwtManager::new();
        manager.set_token("test_token".to_string());

        manager.clear();
        assert!(manager.get_token().is_none());
        assert!(manager.is_expired());
    }

    #[test]
    fn test_clones_share_state() {
        let manager = JwtManager::new();
        let shared = manager.clone();
        manager.set_token("shared".to_string());
        assert_eq!(shared.get_token(), Some("shared".to_string()));
        shared.clear();
        assert!(manager.get_token().is_none());
    }
}
