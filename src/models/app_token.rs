use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// An app token as kept by a storage backend. Only the hash is stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredAppToken {
    pub id: Uuid,
    pub user_id: String,
    pub token_hash: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StoredAppToken {
    /// Build a record for `plaintext` without keeping the plaintext around.
    pub fn new(user_id: &str, plaintext: &str, note: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            token_hash: hash_app_token(plaintext),
            note,
            created_at: Utc::now(),
        }
    }

    /// Constant-time comparison against a presented app token.
    pub fn matches(&self, presented: &str) -> bool {
        let presented = hash_app_token(presented);
        self.token_hash.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

/// Lowercase hex SHA-256 of an app token.
pub fn hash_app_token(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// Fresh random app token: 32 bytes, hex encoded.
pub fn generate_app_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}
