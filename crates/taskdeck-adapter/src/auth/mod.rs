/*
[INPUT]:  Auth Service endpoints and credential file location
[OUTPUT]: Bearer tokens, persisted credentials, and auth errors
[POS]:    Auth layer - handles Task Service authentication
[UPDATE]: When auth flow or credential storage changes
*/

pub mod jwt;
pub mod manager;
pub mod store;

pub use jwt::{JwtManager, TokenData};
pub use manager::AuthManager;
pub use store::CredentialStore;
