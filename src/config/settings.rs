// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for tasks-mcp
//!
//! Handles loading and saving settings from ~/.tasks-mcp/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod io;
mod validation;

/// Main settings structure, stored in ~/.tasks-mcp/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Google Tasks access and OAuth configuration
    #[serde(default)]
    pub google: GoogleConfig,

    /// Language model used by the interactive client
    #[serde(default)]
    pub model: ModelConfig,

    /// How the interactive client launches the tool server
    #[serde(default)]
    pub server: ServerConfig,
}

/// Google Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Application credentials downloaded from the Google Cloud console
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Where the authorized user token is persisted
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Tasks API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// OAuth scopes requested during login
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,

    /// Local port for the OAuth redirect listener (0 picks a free port)
    #[serde(default)]
    pub callback_port: u16,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Language model configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Default model to use
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Base URL for API (for custom endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens for response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum model calls per user turn
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

/// Tool server launch configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Program to spawn; defaults to this executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments for `command`; defaults to `["serve"]` when `command` is unset
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
            api_base_url: default_api_base_url(),
            scopes: default_scopes(),
            callback_port: 0,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            default_model: default_model(),
            base_url: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_steps: default_max_steps(),
        }
    }
}

/// Scope granting read/write access to the user's tasks
pub const TASKS_SCOPE: &str = "https://www.googleapis.com/auth/tasks";

/// Google Tasks v1 REST endpoint
pub const TASKS_API_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

fn default_credentials_path() -> PathBuf {
    Settings::home().join("credentials.json")
}

fn default_token_path() -> PathBuf {
    Settings::home().join("token.json")
}

fn default_api_base_url() -> String {
    TASKS_API_BASE_URL.to_string()
}

fn default_scopes() -> Vec<String> {
    vec![TASKS_SCOPE.to_string()]
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_model() -> String {
    "qwen-qwq-32b".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_steps() -> usize {
    12
}
