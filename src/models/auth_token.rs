use serde::{Deserialize, Serialize};

/// Short-lived credential handed out by the gatekeeper.
///
/// Never persisted here; it lives only as long as the response that carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: String,
    pub valid_for_seconds: u64,
    pub id_in_user_storage: String,
    pub id_from_login: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl AuthToken {
    pub fn new(
        id: impl Into<String>,
        valid_for_seconds: u64,
        id_in_user_storage: impl Into<String>,
        id_from_login: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            valid_for_seconds,
            id_in_user_storage: id_in_user_storage.into(),
            id_from_login: id_from_login.into(),
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }
}
