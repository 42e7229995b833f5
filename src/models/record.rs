//! JSON envelope shared with the gatekeeper: a named data group of
//! name/value children plus a map of action links.
//!
//! Field order in these structs is the wire order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::auth_token::AuthToken;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestRecord {
    pub data: DataGroup,
    #[serde(rename = "actionLinks", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub action_links: BTreeMap<String, ActionLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataGroup {
    pub children: Vec<DataAtomic>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAtomic {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    #[serde(rename = "requestMethod")]
    pub request_method: String,
    pub rel: String,
    pub url: String,
}

impl DataAtomic {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

impl DataGroup {
    /// Value of the first child called `name`.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }
}

impl ActionLink {
    pub fn delete(url: String) -> Self {
        Self {
            request_method: "DELETE".to_string(),
            rel: "delete".to_string(),
            url,
        }
    }
}

impl RestRecord {
    /// Envelope for a freshly issued auth token, with a `delete` link
    /// pointing at `delete_url`.
    pub fn for_auth_token(token: &AuthToken, delete_url: String) -> Self {
        let mut children = vec![
            DataAtomic::new("id", token.id.clone()),
            DataAtomic::new("validForNoSeconds", token.valid_for_seconds.to_string()),
            DataAtomic::new("idInUserStorage", token.id_in_user_storage.clone()),
            DataAtomic::new("idFromLogin", token.id_from_login.clone()),
        ];
        // A name is only reported as a pair.
        if let (Some(first_name), Some(last_name)) = (&token.first_name, &token.last_name) {
            children.push(DataAtomic::new("firstName", first_name.clone()));
            children.push(DataAtomic::new("lastName", last_name.clone()));
        }

        let mut action_links = BTreeMap::new();
        action_links.insert("delete".to_string(), ActionLink::delete(delete_url));

        Self {
            data: DataGroup {
                children,
                name: "authToken".to_string(),
            },
            action_links,
        }
    }

    /// Read an auth token back out of a record, as returned by the gatekeeper.
    pub fn to_auth_token(&self) -> Option<AuthToken> {
        let data = &self.data;
        let mut token = AuthToken::new(
            data.first_value("id")?,
            data.first_value("validForNoSeconds")?.parse().ok()?,
            data.first_value("idInUserStorage")?,
            data.first_value("idFromLogin")?,
        );
        token.first_name = data.first_value("firstName").map(String::from);
        token.last_name = data.first_value("lastName").map(String::from);
        Some(token)
    }
}
