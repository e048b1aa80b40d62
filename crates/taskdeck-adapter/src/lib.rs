/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Task Service adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{AuthManager, CredentialStore, JwtManager, TokenData};

// Re-export commonly used types from http
pub use http::{ClientConfig, DEFAULT_BASE_URL, Result, TaskServiceClient, TaskdeckError};

// Re-export all types
pub use types::*;
