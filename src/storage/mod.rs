pub mod disk;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::app_token::StoredAppToken;

pub use disk::DiskStore;
pub use postgres::PgStore;

/// Abstraction over app token storage backends.
/// Implementations: DiskStore (JSON files), PgStore (Postgres).
#[async_trait]
pub trait AppTokenStorage: Send + Sync {
    /// Does `user_id` own an app token equal to `app_token`?
    async fn user_id_has_app_token(&self, user_id: &str, app_token: &str) -> anyhow::Result<bool>;

    /// Store a new app token for `user_id`.
    async fn add_app_token(&self, token: &StoredAppToken) -> anyhow::Result<()>;

    /// App tokens of `user_id`, oldest first.
    async fn list_app_tokens(&self, user_id: &str) -> anyhow::Result<Vec<StoredAppToken>>;

    /// Remove one app token. Returns false when it did not exist.
    async fn remove_app_token(&self, user_id: &str, token_id: Uuid) -> anyhow::Result<bool>;
}
