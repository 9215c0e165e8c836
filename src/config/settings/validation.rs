// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{Result, TasksError};

use super::Settings;

impl Settings {
    /// Get the model API key, checking the env var first.
    pub fn get_model_api_key(&self) -> Option<String> {
        // Priority: env var > config file.
        std::env::var(&self.model.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.model.api_key.clone())
    }

    /// Resolve the program and arguments used to launch the tool server.
    pub fn server_command(&self) -> Result<(String, Vec<String>)> {
        match &self.server.command {
            Some(command) => Ok((command.clone(), self.server.args.clone())),
            None => {
                let exe = std::env::current_exe()?;
                let args = if self.server.args.is_empty() {
                    vec!["serve".to_string()]
                } else {
                    self.server.args.clone()
                };
                Ok((exe.to_string_lossy().into_owned(), args))
            }
        }
    }

    /// Reject values that cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.google.scopes.is_empty() {
            return Err(TasksError::Config(
                "google.scopes must contain at least one scope".to_string(),
            ));
        }
        if self.google.api_base_url.trim().is_empty() {
            return Err(TasksError::Config(
                "google.api_base_url must not be empty".to_string(),
            ));
        }
        if self.model.max_tokens == 0 {
            return Err(TasksError::Config(
                "model.max_tokens must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(TasksError::Config(format!(
                "model.temperature must be between 0.0 and 2.0, got {}",
                self.model.temperature
            )));
        }
        if self.model.max_steps == 0 {
            return Err(TasksError::Config(
                "model.max_steps must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_scopes() {
        let mut settings = Settings::default();
        settings.google.scopes.clear();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("scopes"));
    }

    #[test]
    fn test_validate_rejects_temperature_out_of_range() {
        let mut settings = Settings::default();
        settings.model.temperature = 3.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_steps() {
        let mut settings = Settings::default();
        settings.model.max_steps = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_api_key_falls_back_to_config() {
        let mut settings = Settings::default();
        settings.model.api_key_env = "TASKS_MCP_TEST_UNSET_KEY_VAR".to_string();
        settings.model.api_key = Some("from-config".to_string());
        assert_eq!(settings.get_model_api_key(), Some("from-config".to_string()));
    }

    #[test]
    fn test_explicit_server_command() {
        let mut settings = Settings::default();
        settings.server.command = Some("/usr/local/bin/tasks-mcp".to_string());
        settings.server.args = vec!["serve".to_string(), "-v".to_string()];

        let (program, args) = settings.server_command().unwrap();
        assert_eq!(program, "/usr/local/bin/tasks-mcp");
        assert_eq!(args, vec!["serve", "-v"]);
    }

    #[test]
    fn test_default_server_command_uses_serve() {
        let settings = Settings::default();
        let (_, args) = settings.server_command().unwrap();
        assert_eq!(args, vec!["serve"]);
    }
}
