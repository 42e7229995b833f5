use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::AppTokenStorage;
use crate::models::app_token::StoredAppToken;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS app_tokens (
    id          UUID PRIMARY KEY,
    user_id     TEXT NOT NULL,
    token_hash  TEXT NOT NULL,
    note        TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)"#;

const INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS app_tokens_user_hash ON app_tokens (user_id, token_hash)";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Create the app token table if it is missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        sqlx::query(INDEX).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AppTokenStorage for PgStore {
    async fn user_id_has_app_token(&self, user_id: &str, app_token: &str) -> anyhow::Result<bool> {
        let rows = sqlx::query_as::<_, StoredAppToken>(
            "SELECT id, user_id, token_hash, note, created_at FROM app_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .fold(false, |found, t| t.matches(app_token) | found))
    }

    async fn add_app_token(&self, token: &StoredAppToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO app_tokens (id, user_id, token_hash, note, created_at)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(token.id)
        .bind(&token.user_id)
        .bind(&token.token_hash)
        .bind(&token.note)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_app_tokens(&self, user_id: &str) -> anyhow::Result<Vec<StoredAppToken>> {
        let rows = sqlx::query_as::<_, StoredAppToken>(
            "SELECT id, user_id, token_hash, note, created_at FROM app_tokens WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn remove_app_token(&self, user_id: &str, token_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM app_tokens WHERE id = $1 AND user_id = $2")
            .bind(token_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
