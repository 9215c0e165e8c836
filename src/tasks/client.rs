// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Authenticated HTTP handle for the Tasks REST API

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::auth::{Authenticator, Credential};
use crate::config::GoogleConfig;
use crate::error::{ApiError, Result, TasksError};

/// Google JSON error envelope
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
}

/// Handle to the Tasks API: base URL, HTTP client and credentials.
pub struct TasksClient {
    http: Client,
    base_url: String,
    auth: Authenticator,
}

impl fmt::Debug for TasksClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TasksClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TasksClient {
    pub fn new(config: &GoogleConfig, auth: Authenticator) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            auth,
        })
    }

    /// Handle using a fixed bearer token against `base_url`.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let config = GoogleConfig {
            api_base_url: base_url.into(),
            ..GoogleConfig::default()
        };
        Self::new(&config, Authenticator::new(Credential::bearer(token), None))
    }

    /// Current access token, refreshed if needed.
    pub async fn bearer_token(&self) -> Result<String> {
        self.auth.bearer_token().await
    }

    /// GET and decode.
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.execute(Method::GET, segments, query, None).await?;
        decode(response).await
    }

    /// Send a JSON body and decode the JSON reply.
    pub async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let response = self.execute(method, segments, &[], Some(body)).await?;
        decode(response).await
    }

    /// POST with query parameters only and decode the reply.
    pub async fn post_query<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.execute(Method::POST, segments, query, None).await?;
        decode(response).await
    }

    /// Call an endpoint whose reply body is empty (DELETE, clear).
    pub async fn call(&self, method: Method, segments: &[&str]) -> Result<()> {
        self.execute(method, segments, &[], None).await?;
        Ok(())
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TasksError::Config(format!("invalid Tasks API base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| TasksError::Config("Tasks API base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = self.url(segments)?;
        let token = self.auth.bearer_token().await?;
        tracing::debug!(target: "tasks_mcp.tasks", %method, %url, "request");

        // Google rejects bodiless POSTs that omit Content-Length.
        let empty_post = body.is_none() && method == Method::POST;
        let mut request = self.http.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        } else if empty_post {
            request = request.header(reqwest::header::CONTENT_LENGTH, "0");
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .map(|e| e.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    body
                }
            });
        tracing::debug!(target: "tasks_mcp.tasks", status = status.as_u16(), %message, "request failed");
        Err(ApiError::from_status(status.as_u16(), message).into())
    }
}

fn transport_error(e: reqwest::Error) -> TasksError {
    if e.is_timeout() {
        ApiError::Timeout.into()
    } else {
        ApiError::Network(e.to_string()).into()
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::InvalidResponse(format!("unexpected response body: {e}")).into())
}
