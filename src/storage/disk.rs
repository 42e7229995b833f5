//! File-backed app token storage.
//!
//! Layout: `<base>/apptokens/<url-encoded user id>.json`, each file a JSON
//! array of `StoredAppToken`. A missing file means the user has no tokens.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::AppTokenStorage;
use crate::models::app_token::StoredAppToken;

#[derive(Clone)]
pub struct DiskStore {
    dir: PathBuf,
    /// Serializes read-modify-write cycles on user files. Shared by clones.
    write_lock: Arc<Mutex<()>>,
}

impl DiskStore {
    /// Open (and create if needed) the token directory under `base_path`.
    pub async fn open(base_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = base_path.as_ref().join("apptokens");
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(Self {
            dir,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn user_file(&self, user_id: &str) -> PathBuf {
        // Encoding removes '/', '\\' and '.' sequences that could leave the directory.
        let name = urlencoding::encode(user_id).replace('.', "%2E");
        self.dir.join(format!("{name}.json"))
    }

    async fn read_user(&self, user_id: &str) -> anyhow::Result<Vec<StoredAppToken>> {
        let path = self.user_file(user_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt app token file {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    async fn write_user(&self, user_id: &str, tokens: &[StoredAppToken]) -> anyhow::Result<()> {
        let path = self.user_file(user_id);
        if tokens.is_empty() {
            return match tokio::fs::remove_file(&path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    Err(e).with_context(|| format!("failed to remove {}", path.display()))
                }
                _ => Ok(()),
            };
        }

        let json = serde_json::to_vec_pretty(tokens)?;
        let tmp = path.with_extension(format!("json.{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl AppTokenStorage for DiskStore {
    async fn user_id_has_app_token(&self, user_id: &str, app_token: &str) -> anyhow::Result<bool> {
        let tokens = self.read_user(user_id).await?;
        // Check every entry so timing does not reveal the position of a match.
        Ok(tokens
            .iter()
            .fold(false, |found, t| t.matches(app_token) | found))
    }

    async fn add_app_token(&self, token: &StoredAppToken) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut tokens = self.read_user(&token.user_id).await?;
        tokens.push(token.clone());
        self.write_user(&token.user_id, &tokens).await
    }

    async fn list_app_tokens(&self, user_id: &str) -> anyhow::Result<Vec<StoredAppToken>> {
        let mut tokens = self.read_user(user_id).await?;
        tokens.sort_by_key(|t| t.created_at);
        Ok(tokens)
    }

    async fn remove_app_token(&self, user_id: &str, token_id: Uuid) -> anyhow::Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut tokens = self.read_user(user_id).await?;
        let before = tokens.len();
        tokens.retain(|t| t.id != token_id);
        if tokens.len() == before {
            return Ok(false);
        }
        self.write_user(user_id, &tokens).await?;
        Ok(true)
    }
}
