// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Google OAuth credentials and the cached API session
//!
//! `Session::handle` is the single entry point used by the task operations.
//! It loads `token.json`, refreshes it when possible, and otherwise runs the
//! browser consent flow against the client registered in `credentials.json`.

pub mod authenticator;
pub mod callback;
pub mod oauth;
pub mod secrets;
pub mod session;
pub mod token;

pub use authenticator::Authenticator;
pub use oauth::OAuthClient;
pub use secrets::ClientSecrets;
pub use session::Session;
pub use token::{Credential, TokenStore};
