// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Authorized-user credential and its on-disk store
//!
//! The file layout matches the "authorized user" JSON written by Google's
//! client libraries, so a token produced by other tooling can be reused.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Tokens expiring within this window are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Default Google token endpoint
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// An OAuth access token plus what is needed to refresh it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer access token
    pub token: String,

    /// Long-lived refresh token, when the grant produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Endpoint used to refresh the access token
    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Scopes granted to the token
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the access token stops being accepted (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

impl Credential {
    /// A bare bearer token with no expiry and no way to refresh.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
            token_uri: default_token_uri(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: Vec::new(),
            expiry: None,
        }
    }

    /// Whether the access token is expired (or about to be).
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            None => false,
        }
    }

    /// Whether a refresh grant can be attempted.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
            && !self.client_id.is_empty()
    }

    /// Whether the credential carries every scope in `required`.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        self.scopes.is_empty() || required.iter().all(|scope| self.scopes.contains(scope))
    }
}

/// File-backed credential persistence
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored credential. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let credential = serde_json::from_str(&content)?;
        Ok(Some(credential))
    }

    /// Write the credential, readable by the owner only on Unix.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(credential)?;
        std::fs::write(&self.path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Remove the stored credential if present.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
