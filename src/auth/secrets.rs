// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Application credentials (`credentials.json`) from the Google Cloud console

use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, TasksError};

use super::token::GOOGLE_TOKEN_URI;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// OAuth client registration for an installed (desktop) application
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

/// Top-level wrapper; the console nests the client under its type.
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl ClientSecrets {
    /// Load and unwrap the client registration from a credentials file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TasksError::Config(format!(
                "OAuth client credentials not found at {}. Download an OAuth client \
                 (Desktop app) JSON from the Google Cloud console and save it there.",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)?;
        file.installed.or(file.web).ok_or_else(|| {
            TasksError::Config(
                "credentials file has neither an \"installed\" nor a \"web\" client".to_string(),
            )
        })
    }
}
