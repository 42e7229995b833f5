pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth_token::AuthToken;

pub use http::GatekeeperClient;

/// Failure reported by the token issuing service.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("gatekeeper answered {status}: {body}")]
    Refused { status: u16, body: String },

    #[error("gatekeeper unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gatekeeper returned an unusable auth token: {0}")]
    MalformedToken(String),
}

/// Issues and revokes short-lived auth tokens for a user.
/// Implementations: GatekeeperClient (HTTP).
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Ask for a new auth token for `user_id`.
    async fn issue(&self, user_id: &str) -> Result<AuthToken, AuthenticationError>;

    /// Invalidate `auth_token` belonging to `user_id`.
    async fn revoke(&self, user_id: &str, auth_token: &str) -> Result<(), AuthenticationError>;
}
