// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OAuth 2.0 installed-application flow
//!
//! Supports:
//! - Authorization URL construction with a random `state`
//! - Authorization code exchange
//! - Token refresh

use chrono::{Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::{Result, TasksError};

use super::callback::CallbackServer;
use super::secrets::ClientSecrets;
use super::token::Credential;

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// OAuth client for one registered application
pub struct OAuthClient {
    secrets: ClientSecrets,
    scopes: Vec<String>,
    http: Client,
}

impl OAuthClient {
    pub fn new(secrets: ClientSecrets, scopes: Vec<String>) -> Self {
        Self {
            secrets,
            scopes,
            http: Client::new(),
        }
    }

    /// Consent page URL for the given redirect and state.
    ///
    /// Requests offline access so the grant yields a refresh token.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<String> {
        let scope = self.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", scope.as_str()),
                ("state", state),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| TasksError::Config(format!("invalid auth_uri: {e}")))?;
        Ok(url.to_string())
    }

    /// Exchange an authorization code for a credential.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<Credential> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
        ];
        let response = request_token(&self.http, &self.secrets.token_uri, &params).await?;

        Ok(Credential {
            token: response.access_token,
            refresh_token: response.refresh_token,
            token_uri: self.secrets.token_uri.clone(),
            client_id: self.secrets.client_id.clone(),
            client_secret: self.secrets.client_secret.clone(),
            scopes: response
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_else(|| self.scopes.clone()),
            expiry: response
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        })
    }

    /// Run the full browser flow: listen, prompt, wait, exchange.
    pub async fn authorize(&self, callback_port: u16) -> Result<Credential> {
        let server = CallbackServer::bind(callback_port).await?;
        let redirect_uri = server.redirect_uri();
        let state = uuid::Uuid::new_v4().to_string();
        let url = self.authorization_url(&redirect_uri, &state)?;

        eprintln!("Please visit this URL to authorize access to Google Tasks:\n\n{url}\n");
        if let Err(e) = open::that(&url) {
            tracing::debug!(target: "tasks_mcp.auth", error = %e, "could not open browser");
        }

        let code = server.wait_for_code(&state).await?;
        tracing::info!(target: "tasks_mcp.auth", "authorization code received");
        self.exchange_code(&code, &redirect_uri).await
    }
}

/// Refresh an expired access token using the credential's own client data.
///
/// The refresh token is kept when the endpoint does not rotate it.
pub async fn refresh(http: &Client, credential: &Credential) -> Result<Credential> {
    let refresh_token = credential
        .refresh_token
        .as_deref()
        .ok_or_else(|| TasksError::Auth("credential has no refresh token".to_string()))?;

    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", credential.client_id.as_str()),
        ("client_secret", credential.client_secret.as_str()),
    ];
    let response = request_token(http, &credential.token_uri, &params).await?;

    let mut refreshed = credential.clone();
    refreshed.token = response.access_token;
    if let Some(token) = response.refresh_token {
        refreshed.refresh_token = Some(token);
    }
    if let Some(scope) = response.scope {
        refreshed.scopes = scope.split_whitespace().map(str::to_string).collect();
    }
    refreshed.expiry = response
        .expires_in
        .map(|secs| Utc::now() + Duration::seconds(secs));
    Ok(refreshed)
}

async fn request_token(http: &Client, token_uri: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
    let response = http
        .post(token_uri)
        .form(params)
        .send()
        .await
        .map_err(|e| TasksError::Auth(format!("token endpoint unreachable: {e}")))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(TasksError::Auth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| TasksError::Auth(format!("invalid token response: {e}")))
}
