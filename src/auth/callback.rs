// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Loopback listener that receives the OAuth redirect

use reqwest::Url;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::error::{Result, TasksError};

const SUCCESS_HTML: &str = "<html><body><h1>Authentication complete</h1>\
<p>You can close this tab and return to your terminal.</p></body></html>";

/// Query parameters carried by the redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// One-shot HTTP listener on 127.0.0.1
pub struct CallbackServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl CallbackServer {
    /// Bind the listener. Port 0 picks a free port.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await.map_err(|e| {
            TasksError::Auth(format!("failed to bind callback listener on port {port}: {e}"))
        })?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Redirect URI to register in the authorization request.
    pub fn redirect_uri(&self) -> String {
        format!("http://127.0.0.1:{}/", self.addr.port())
    }

    /// Wait for the redirect and return the authorization code.
    ///
    /// Requests without any OAuth parameters (favicon probes and the like)
    /// are answered with 404 and skipped.
    pub async fn wait_for_code(&self, expected_state: &str) -> Result<String> {
        loop {
            let (mut stream, peer) = self.listener.accept().await?;
            tracing::debug!(target: "tasks_mcp.auth", %peer, "callback connection");

            let mut buffer = vec![0u8; 4096];
            let n = stream.read(&mut buffer).await?;
            let request = String::from_utf8_lossy(&buffer[..n]);

            let Some(params) = parse_request_line(&request) else {
                let _ = stream.write_all(http_response(404, "Not Found", "").as_bytes()).await;
                continue;
            };

            let outcome = validate(params, expected_state);
            let response = match &outcome {
                Ok(_) => http_response(200, "OK", SUCCESS_HTML),
                Err(e) => http_response(
                    400,
                    "Bad Request",
                    &format!("<html><body><h1>Authentication failed</h1><p>{e}</p></body></html>"),
                ),
            };
            if let Err(e) = stream.write_all(response.as_bytes()).await {
                tracing::warn!(target: "tasks_mcp.auth", error = %e, "failed to answer callback");
            }
            return outcome;
        }
    }
}

/// Extract OAuth parameters from the first line of an HTTP request.
///
/// Returns `None` when the request carries none of `code`, `state`, `error`.
pub fn parse_request_line(request: &str) -> Option<CallbackParams> {
    let target = request.lines().next()?.split_whitespace().nth(1)?;
    let url = Url::parse("http://127.0.0.1").ok()?.join(target).ok()?;

    let mut params = CallbackParams {
        code: None,
        state: None,
        error: None,
    };
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => params.code = Some(value.into_owned()),
            "state" => params.state = Some(value.into_owned()),
            "error" => params.error = Some(value.into_owned()),
            _ => {}
        }
    }

    if params.code.is_none() && params.state.is_none() && params.error.is_none() {
        None
    } else {
        Some(params)
    }
}

fn validate(params: CallbackParams, expected_state: &str) -> Result<String> {
    if let Some(error) = params.error {
        return Err(TasksError::Auth(format!("authorization denied: {error}")));
    }
    if params.state.as_deref() != Some(expected_state) {
        return Err(TasksError::Auth(
            "state mismatch in OAuth callback".to_string(),
        ));
    }
    params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| TasksError::Auth("no authorization code in OAuth callback".to_string()))
}

fn http_response(status: u16, reason: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}
