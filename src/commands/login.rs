// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OAuth login command

use crate::auth::Session;
use crate::config::Settings;
use crate::error::Result;

/// Run the browser consent flow and store the token.
pub async fn execute(settings: &Settings) -> Result<()> {
    let credential = Session::login(&settings.google).await?;

    eprintln!("Logged in. Token saved to {}", settings.google.token_path.display());
    if credential.refresh_token.is_none() {
        eprintln!("Warning: no refresh token was issued; you will need to log in again when it expires.");
    }
    Ok(())
}
