// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Interactive chat command

use std::path::Path;
use std::sync::Arc;

use crate::agent::{Agent, AgentConfig};
use crate::chat::Repl;
use crate::cli::ChatArgs;
use crate::config::Settings;
use crate::error::{Result, TasksError};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::GroqProvider;
use crate::mcp::McpClient;

/// Resolve the tool server command: CLI flags win over settings.
///
/// When the default (this binary's `serve`) is used, an explicit config
/// path is passed along so both processes read the same settings.
pub fn server_command(
    args: &ChatArgs,
    settings: &Settings,
    config_path: Option<&Path>,
) -> Result<(String, Vec<String>)> {
    if let Some(program) = &args.server_command {
        return Ok((program.clone(), args.server_arg.clone()));
    }

    let (program, mut server_args) = settings.server_command()?;
    if let (None, Some(path)) = (&settings.server.command, config_path) {
        server_args.push("--config".to_string());
        server_args.push(path.to_string_lossy().into_owned());
    }
    Ok((program, server_args))
}

/// Build the model provider from settings.
pub fn provider(settings: &Settings) -> Result<Arc<dyn LlmProvider>> {
    let api_key = settings.get_model_api_key().ok_or_else(|| {
        TasksError::Config(format!(
            "no model API key; set {} or model.api_key in settings",
            settings.model.api_key_env
        ))
    })?;

    let provider = match &settings.model.base_url {
        Some(url) => GroqProvider::with_base_url(api_key, url.clone())?,
        None => GroqProvider::new(api_key)?,
    };
    Ok(Arc::new(provider))
}

/// Spawn the tool server, bind its tools to the model, and run the REPL.
pub async fn execute(args: ChatArgs, settings: &Settings, config_path: Option<&Path>) -> Result<()> {
    let provider = provider(settings)?;
    let (program, server_args) = server_command(&args, settings, config_path)?;

    let client = Arc::new(McpClient::spawn(&program, &server_args)?);
    client.initialize().await?;
    let tools = client.tool_definitions().await?;
    tracing::info!(target: "tasks_mcp.mcp.client", tools = tools.len(), "loaded tools");

    let mut config = AgentConfig::from_model_config(&settings.model);
    if let Some(model) = args.model {
        config = config.with_model(model);
    }

    let agent = Agent::new(provider, client.clone(), tools, config);
    Repl::stdio().run(&agent).await?;
    drop(agent);

    match Arc::try_unwrap(client) {
        Ok(client) => client.shutdown().await,
        Err(_) => Ok(()),
    }
}
