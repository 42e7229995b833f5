use axum::http::StatusCode;
use axum::Json;

use crate::errors::AppError;
use crate::gatekeeper::TokenProvider;
use crate::models::record::RestRecord;
use crate::storage::AppTokenStorage;

/// Exchanges app tokens for auth tokens on behalf of one request.
///
/// Holds the collaborators plus the base URL (`scheme://host[:port]`) the
/// request arrived on; nothing outlives the request.
pub struct AppTokenEndpoint<'a> {
    storage: &'a dyn AppTokenStorage,
    token_provider: &'a dyn TokenProvider,
    public_path: &'a str,
    base_url: String,
}

impl<'a> AppTokenEndpoint<'a> {
    pub fn new(
        storage: &'a dyn AppTokenStorage,
        token_provider: &'a dyn TokenProvider,
        public_path: &'a str,
        base_url: String,
    ) -> Self {
        Self {
            storage,
            token_provider,
            public_path,
            base_url,
        }
    }

    /// Verify the user/app token pairing and hand out a fresh auth token.
    pub async fn issue_token(
        &self,
        user_id: &str,
        app_token: &str,
    ) -> Result<(StatusCode, Json<RestRecord>), AppError> {
        let paired = self
            .storage
            .user_id_has_app_token(user_id, app_token)
            .await
            .map_err(AppError::Storage)?;
        if !paired {
            tracing::warn!(user_id, "app token does not match any stored token for user");
            return Err(AppError::PairingNotFound);
        }

        let auth_token = self
            .token_provider
            .issue(user_id)
            .await
            .map_err(AppError::IssueFailed)?;

        tracing::info!(user_id, valid_for = auth_token.valid_for_seconds, "issued auth token");
        let record = RestRecord::for_auth_token(&auth_token, self.delete_url(user_id));
        Ok((StatusCode::CREATED, Json(record)))
    }

    /// Ask the gatekeeper to forget `auth_token`.
    pub async fn revoke_token(&self, user_id: &str, auth_token: &str) -> Result<StatusCode, AppError> {
        self.token_provider
            .revoke(user_id, auth_token)
            .await
            .map_err(AppError::AuthTokenNotFound)?;

        tracing::info!(user_id, "removed auth token");
        Ok(StatusCode::OK)
    }

    /// Absolute URL of the revoke operation for `user_id`.
    pub fn delete_url(&self, user_id: &str) -> String {
        let path = self.public_path.trim_end_matches('/');
        let slash = if path.starts_with('/') || path.is_empty() { "" } else { "/" };
        format!(
            "{}{}{}/apptoken/{}",
            self.base_url,
            slash,
            path,
            urlencoding::encode(user_id)
        )
    }
}
