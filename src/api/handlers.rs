use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    Json,
};

use super::endpoint::AppTokenEndpoint;
use super::request_url::{base_url, effective_scheme, forwarded_proto, request_url};
use crate::errors::AppError;
use crate::models::record::RestRecord;
use crate::AppState;

fn endpoint_for<'a>(state: &'a AppState, uri: &Uri, headers: &HeaderMap) -> AppTokenEndpoint<'a> {
    let proto = forwarded_proto(headers);
    let base = match request_url(uri, headers) {
        Some(url) => base_url(&url, proto),
        None => {
            tracing::warn!(%uri, "could not reconstruct request URL, using localhost");
            format!("{}://localhost", effective_scheme("http", proto))
        }
    };

    AppTokenEndpoint::new(
        state.storage.as_ref(),
        state.token_provider.as_ref(),
        &state.public_path_to_system,
        base,
    )
}

/// POST /apptoken/:user_id/:app_token — exchange an app token for an auth token
pub async fn issue_auth_token(
    State(state): State<Arc<AppState>>,
    Path((user_id, app_token)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<RestRecord>), AppError> {
    endpoint_for(&state, &uri, &headers)
        .issue_token(&user_id, &app_token)
        .await
}

/// DELETE /apptoken/:user_id/:auth_token — revoke an auth token
pub async fn remove_auth_token(
    State(state): State<Arc<AppState>>,
    Path((user_id, auth_token)): Path<(String, String)>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    endpoint_for(&state, &uri, &headers)
        .revoke_token(&user_id, &auth_token)
        .await
}
