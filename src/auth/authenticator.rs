// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use reqwest::Client;
use tokio::sync::Mutex;

use crate::error::{Result, TasksError};

use super::oauth;
use super::token::{Credential, TokenStore};

/// Supplies a valid bearer token, refreshing it in place when it expires.
pub struct Authenticator {
    credential: Mutex<Credential>,
    store: Option<TokenStore>,
    http: Client,
}

impl Authenticator {
    pub fn new(credential: Credential, store: Option<TokenStore>) -> Self {
        Self {
            credential: Mutex::new(credential),
            store,
            http: Client::new(),
        }
    }

    /// Current access token, refreshed first if it has expired.
    pub async fn bearer_token(&self) -> Result<String> {
        let mut credential = self.credential.lock().await;
        if credential.is_expired() {
            if !credential.can_refresh() {
                return Err(TasksError::Auth(
                    "access token expired and cannot be refreshed; run `tasks-mcp login`"
                        .to_string(),
                ));
            }
            tracing::debug!(target: "tasks_mcp.auth", "refreshing expired access token");
            let refreshed = oauth::refresh(&self.http, &credential).await?;
            if let Some(store) = &self.store {
                store.save(&refreshed)?;
            }
            *credential = refreshed;
        }
        Ok(credential.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_valid_token_returned_as_is() {
        let auth = Authenticator::new(Credential::bearer("fixed"), None);
        assert_eq!(auth.bearer_token().await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn test_expired_without_refresh_fails() {
        let mut credential = Credential::bearer("old");
        credential.expiry = Some(Utc::now() - Duration::hours(1));
        let auth = Authenticator::new(credential, None);

        let err = auth.bearer_token().await.unwrap_err();
        assert_eq!(err.kind(), "auth");
    }

    #[tokio::test]
    async fn test_expired_token_refreshed_and_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));

        let mut credential = Credential::bearer("old");
        credential.refresh_token = Some("r".to_string());
        credential.client_id = "cid".to_string();
        credential.token_uri = format!("{}/token", server.uri());
        credential.expiry = Some(Utc::now() - Duration::hours(1));

        let auth = Authenticator::new(credential, Some(store.clone()));
        assert_eq!(auth.bearer_token().await.unwrap(), "fresh");
        // Second call uses the refreshed token without another grant.
        assert_eq!(auth.bearer_token().await.unwrap(), "fresh");

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.token, "fresh");
        assert_eq!(saved.refresh_token.as_deref(), Some("r"));
    }
}
