//! Apptoken Verifier — exchanges a user's long-lived app token for a
//! short-lived auth token issued by the gatekeeper.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod errors;
pub mod gatekeeper;
pub mod models;
pub mod storage;

use gatekeeper::TokenProvider;
use storage::AppTokenStorage;

/// Shared application state passed to handlers.
pub struct AppState {
    pub storage: Arc<dyn AppTokenStorage>,
    pub token_provider: Arc<dyn TokenProvider>,
    /// Base path of this service as seen from outside, e.g. `/apptokenverifier/rest/`.
    pub public_path_to_system: String,
}
