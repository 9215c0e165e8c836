// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Memoized access to the authenticated Tasks API handle

use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::config::GoogleConfig;
use crate::error::{Result, TasksError};
use crate::tasks::TasksClient;

use super::authenticator::Authenticator;
use super::oauth::{self, OAuthClient};
use super::secrets::ClientSecrets;
use super::token::{Credential, TokenStore};

/// Owns the single authenticated handle for the process.
///
/// The handle is built on first use and reused afterwards. A failed build
/// is not cached, so the next call tries again.
pub struct Session {
    config: GoogleConfig,
    handle: OnceCell<Arc<TasksClient>>,
}

impl Session {
    pub fn new(config: GoogleConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
        }
    }

    /// A session whose handle is already built.
    pub fn with_handle(client: TasksClient) -> Self {
        Self {
            config: GoogleConfig::default(),
            handle: OnceCell::new_with(Some(Arc::new(client))),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    /// Return the authenticated handle, building it on first call.
    pub async fn handle(&self) -> Result<Arc<TasksClient>> {
        self.handle
            .get_or_try_init(|| self.build_handle())
            .await
            .cloned()
            .map_err(|e| {
                tracing::error!(target: "tasks_mcp.auth", error = %e, "failed to build Tasks API handle");
                match e {
                    TasksError::Auth(message) => TasksError::Auth(message),
                    other => TasksError::Auth(other.to_string()),
                }
            })
    }

    async fn build_handle(&self) -> Result<Arc<TasksClient>> {
        let store = TokenStore::new(&self.config.token_path);
        let credential = self.obtain_credential(&store).await?;
        let auth = Authenticator::new(credential, Some(store));
        let client = TasksClient::new(&self.config, auth)?;
        tracing::info!(target: "tasks_mcp.auth", "Tasks API handle ready");
        Ok(Arc::new(client))
    }

    async fn obtain_credential(&self, store: &TokenStore) -> Result<Credential> {
        match store.load() {
            Ok(Some(credential)) if !credential.has_scopes(&self.config.scopes) => {
                tracing::info!(target: "tasks_mcp.auth", "stored token lacks required scopes");
            }
            Ok(Some(credential)) if !credential.is_expired() => return Ok(credential),
            Ok(Some(credential)) if credential.can_refresh() => {
                match oauth::refresh(&reqwest::Client::new(), &credential).await {
                    Ok(refreshed) => {
                        store.save(&refreshed)?;
                        return Ok(refreshed);
                    }
                    Err(e) => {
                        tracing::warn!(target: "tasks_mcp.auth", error = %e, "token refresh failed");
                    }
                }
            }
            Ok(Some(_)) => {
                tracing::info!(target: "tasks_mcp.auth", "stored token expired and has no refresh token");
            }
            Ok(None) => {
                tracing::debug!(target: "tasks_mcp.auth", path = %store.path().display(), "no stored token");
            }
            Err(e) => {
                tracing::warn!(target: "tasks_mcp.auth", error = %e, "ignoring unreadable token file");
            }
        }

        Self::login(&self.config).await
    }

    /// Run the interactive consent flow and persist the resulting token.
    pub async fn login(config: &GoogleConfig) -> Result<Credential> {
        let secrets = ClientSecrets::load(&config.credentials_path)?;
        let client = OAuthClient::new(secrets, config.scopes.clone());
        let credential = client.authorize(config.callback_port).await?;
        TokenStore::new(&config.token_path).save(&credential)?;
        tracing::info!(target: "tasks_mcp.auth", path = %config.token_path.display(), "token saved");
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> GoogleConfig {
        GoogleConfig {
            credentials_path: dir.path().join("credentials.json"),
            token_path: dir.path().join("token.json"),
            ..GoogleConfig::default()
        }
    }

    #[tokio::test]
    async fn test_with_handle_is_memoized() {
        let client = TasksClient::with_token("http://127.0.0.1:9", "token").unwrap();
        let session = Session::with_handle(client);
        assert!(session.is_initialized());

        let first = session.handle().await.unwrap();
        let second = session.handle().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_handle_from_stored_token() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let mut credential = Credential::bearer("stored");
        credential.expiry = Some(Utc::now() + Duration::hours(1));
        TokenStore::new(&config.token_path).save(&credential).unwrap();

        let session = Session::new(config);
        assert!(!session.is_initialized());

        let first = session.handle().await.unwrap();
        let second = session.handle().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.bearer_token().await.unwrap(), "stored");
    }

    #[tokio::test]
    async fn test_missing_credentials_is_auth_error_and_not_cached() {
        let dir = TempDir::new().unwrap();
        let session = Session::new(config_in(&dir));

        let err = session.handle().await.unwrap_err();
        assert_eq!(err.kind(), "auth");
        assert!(err.to_string().contains("credentials.json"));
        assert!(!session.is_initialized());

        // Still failing, still retried.
        assert!(session.handle().await.is_err());
    }
}
