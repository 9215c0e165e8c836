// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! MCP server command

use std::sync::Arc;

use crate::auth::Session;
use crate::config::Settings;
use crate::error::Result;
use crate::mcp::{McpServer, StdioTransport};
use crate::tasks::TaskService;
use crate::tools::ToolRegistry;

/// Build the tool registry backed by a lazily authenticated session.
pub fn registry(settings: &Settings) -> ToolRegistry {
    let session = Arc::new(Session::new(settings.google.clone()));
    ToolRegistry::with_task_tools(Arc::new(TaskService::new(session)))
}

/// Serve the task tools on stdin/stdout until stdin closes.
///
/// Authentication is deferred to the first tool call, so a missing token
/// does not prevent the handshake or `tools/list`.
pub async fn execute(settings: &Settings) -> Result<()> {
    let registry = registry(settings);
    for name in registry.names() {
        tracing::debug!(target: "tasks_mcp.mcp.server", tool = %name, "registered tool");
    }

    McpServer::new(Arc::new(registry))
        .run(StdioTransport::stdio())
        .await
}
