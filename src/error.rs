// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for tasks-mcp
//!
//! Every task operation returns `Result<T, TasksError>`. The tool layer turns
//! the error into a tagged payload using [`TasksError::kind`], so callers can
//! tell a failure apart from a successful result without reading the text.

use thiserror::Error;

/// Main error type for tasks-mcp operations
#[derive(Error, Debug)]
pub enum TasksError {
    /// Remote API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Credential acquisition or refresh failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// MCP protocol or transport errors
    #[error("MCP error: {0}")]
    Mcp(String),

    /// Agent loop errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Remote API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Credentials were rejected (HTTP 401)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Caller lacks access to the resource (HTTP 403)
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected as malformed (HTTP 400, 409, 412)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limited by the API
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,
}

impl ApiError {
    /// Classify a non-success HTTP status and its message.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => ApiError::AuthenticationFailed(message),
            403 => ApiError::PermissionDenied(message),
            404 => ApiError::NotFound(message),
            400 | 409 | 412 => ApiError::InvalidRequest(message),
            429 => ApiError::RateLimited(60),
            _ => ApiError::ServerError { status, message },
        }
    }

    /// Stable snake_case discriminant
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::AuthenticationFailed(_) => "unauthenticated",
            ApiError::PermissionDenied(_) => "permission_denied",
            ApiError::NotFound(_) => "not_found",
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::RateLimited(_) => "rate_limited",
            ApiError::Network(_) => "network",
            ApiError::InvalidResponse(_) => "invalid_response",
            ApiError::ServerError { .. } => "server_error",
            ApiError::Timeout => "timeout",
        }
    }
}

impl TasksError {
    /// Stable snake_case discriminant used on the tool boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            TasksError::Api(api) => api.kind(),
            TasksError::Auth(_) => "auth",
            TasksError::Config(_) => "config",
            TasksError::InvalidInput(_) => "invalid_request",
            TasksError::Mcp(_) => "protocol",
            TasksError::Agent(_) => "agent",
            TasksError::Io(_) => "io",
            TasksError::Json(_) => "invalid_response",
            TasksError::Http(e) if e.is_timeout() => "timeout",
            TasksError::Http(_) => "network",
        }
    }
}

/// Result type alias for tasks-mcp operations
pub type Result<T> = std::result::Result<T, TasksError>;
