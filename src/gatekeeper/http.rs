//! HTTP client for the gatekeeper's auth token resource.
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::StatusCode;

use super::{AuthenticationError, TokenProvider};
use crate::models::auth_token::AuthToken;
use crate::models::record::RestRecord;

#[derive(Clone)]
pub struct GatekeeperClient {
    client: reqwest::Client,
    base_url: String,
}

impl GatekeeperClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("apptoken-verifier/1.0")
            .build()
            .context("failed to build gatekeeper HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn auth_token_url(&self, user_id: &str) -> String {
        format!(
            "{}/rest/authToken/{}",
            self.base_url,
            urlencoding::encode(user_id)
        )
    }
}

#[async_trait]
impl TokenProvider for GatekeeperClient {
    async fn issue(&self, user_id: &str) -> Result<AuthToken, AuthenticationError> {
        let resp = self
            .client
            .post(self.auth_token_url(user_id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthenticationError::Refused {
                status: status.as_u16(),
                body,
            });
        }

        let record: RestRecord = resp
            .json()
            .await
            .map_err(|e| AuthenticationError::MalformedToken(e.to_string()))?;

        let token = record.to_auth_token().ok_or_else(|| {
            AuthenticationError::MalformedToken("missing or invalid auth token fields".into())
        })?;

        tracing::debug!(user_id, valid_for = token.valid_for_seconds, "Gatekeeper issued auth token");
        Ok(token)
    }

    async fn revoke(&self, user_id: &str, auth_token: &str) -> Result<(), AuthenticationError> {
        let resp = self
            .client
            .delete(self.auth_token_url(user_id))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(auth_token.to_string())
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthenticationError::Refused {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(user_id, "Gatekeeper removed auth token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ISSUED: &str = r#"{"data":{"children":[
        {"name":"id","value":"someAuthToken"},
        {"name":"validForNoSeconds","value":"278"},
        {"name":"idInUserStorage","value":"someIdInUserStorage"},
        {"name":"idFromLogin","value":"someIdFromLogin"},
        {"name":"firstName","value":"someFirstName"},
        {"name":"lastName","value":"someLastName"}
    ],"name":"authToken"}}"#;

    #[tokio::test]
    async fn test_issue_parses_created_record() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/gatekeeper/rest/authToken/someUserId"))
            .respond_with(ResponseTemplate::new(201).set_body_raw(ISSUED, "application/json"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GatekeeperClient::new(&format!("{}/gatekeeper/", mock_server.uri())).unwrap();
        let token = client.issue("someUserId").await.unwrap();

        assert_eq!(
            token,
            AuthToken::new("someAuthToken", 278, "someIdInUserStorage", "someIdFromLogin")
                .with_name("someFirstName", "someLastName")
        );
    }

    #[tokio::test]
    async fn test_issue_refused_by_gatekeeper() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/authToken/someUserId"))
            .respond_with(ResponseTemplate::new(401).set_body_string("no such user"))
            .mount(&mock_server)
            .await;

        let client = GatekeeperClient::new(&mock_server.uri()).unwrap();
        let err = client.issue("someUserId").await.unwrap_err();

        match err {
            AuthenticationError::Refused { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "no such user");
            }
            other => panic!("expected Refused, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_issue_with_incomplete_record_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/authToken/someUserId"))
            .respond_with(ResponseTemplate::new(201).set_body_raw(
                r#"{"data":{"children":[{"name":"id","value":"x"}],"name":"authToken"}}"#,
                "application/json",
            ))
            .mount(&mock_server)
            .await;

        let client = GatekeeperClient::new(&mock_server.uri()).unwrap();
        let err = client.issue("someUserId").await.unwrap_err();
        assert!(matches!(err, AuthenticationError::MalformedToken(_)));
    }

    #[tokio::test]
    async fn test_revoke_sends_token_as_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/authToken/someUserId"))
            .and(body_string("someAuthToken"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GatekeeperClient::new(&mock_server.uri()).unwrap();
        client.revoke("someUserId", "someAuthToken").await.unwrap();
    }

    #[tokio::test]
    async fn test_revoke_unknown_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/authToken/someUserId"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = GatekeeperClient::new(&mock_server.uri()).unwrap();
        let err = client.revoke("someUserId", "gone").await.unwrap_err();
        assert!(matches!(err, AuthenticationError::Refused { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_unreachable_gatekeeper_is_transport_error() {
        let client = GatekeeperClient::new("http://127.0.0.1:1").unwrap();
        let err = client.issue("someUserId").await.unwrap_err();
        assert!(matches!(err, AuthenticationError::Transport(_)));
    }

    #[test]
    fn test_user_id_is_path_encoded() {
        let client = GatekeeperClient::new("http://gk.local/gatekeeper/").unwrap();
        assert_eq!(
            client.auth_token_url("a b/c"),
            "http://gk.local/gatekeeper/rest/authToken/a%20b%2Fc"
        );
    }
}
