// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! MCP client: spawns the tool server and talks to it over its stdio

use async_trait::async_trait;
use serde_json::{json, Value};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;

use super::protocol::*;
use super::transport::LineTransport;
use crate::agent::ToolInvoker;
use crate::error::{Result, TasksError};
use crate::llm::provider::ToolDefinition;

type BoxedReader = Box<dyn AsyncBufRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Connection to one MCP server
pub struct McpClient {
    transport: Mutex<LineTransport<BoxedReader, BoxedWriter>>,
    next_id: AtomicU64,
    child: Option<Child>,
}

impl McpClient {
    /// Wrap an existing connection. No handshake is performed.
    pub fn connect<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            transport: Mutex::new(LineTransport::new(Box::new(reader), Box::new(writer))),
            next_id: AtomicU64::new(1),
            child: None,
        }
    }

    /// Spawn `program` as a child process and connect to its stdio.
    ///
    /// The child's stderr is inherited so its logs and OAuth prompts reach
    /// the terminal.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self> {
        tracing::debug!(target: "tasks_mcp.mcp.client", %program, ?args, "spawning tool server");
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TasksError::Mcp(format!("failed to spawn tool server ({program}): {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TasksError::Mcp("tool server stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TasksError::Mcp("tool server stdout unavailable".to_string()))?;

        let mut client = Self::connect(BufReader::new(stdout), stdin);
        client.child = Some(child);
        Ok(client)
    }

    /// Capability handshake: `initialize` then `notifications/initialized`.
    pub async fn initialize(&self) -> Result<InitializeResult> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": Implementation::current(),
        });
        let result: InitializeResult =
            serde_json::from_value(self.request("initialize", Some(params)).await?)?;
        self.notify("notifications/initialized").await?;

        tracing::info!(
            target: "tasks_mcp.mcp.client",
            server = %result.server_info.name,
            version = %result.server_info.version,
            "connected to tool server"
        );
        Ok(result)
    }

    /// Tools offered by the server.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let result: ToolsListResult =
            serde_json::from_value(self.request("tools/list", None).await?)?;
        Ok(result.tools)
    }

    /// Tools offered by the server, as model-facing definitions.
    pub async fn tool_definitions(&self) -> Result<Vec<ToolDefinition>> {
        Ok(self
            .list_tools()
            .await?
            .into_iter()
            .map(Tool::into_definition)
            .collect())
    }

    /// Invoke a tool by name.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        let params = json!({ "name": name, "arguments": arguments });
        let result = self.request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn ping(&self) -> Result<()> {
        self.request("ping", None).await?;
        Ok(())
    }

    /// Send a request and wait for the response carrying the same id.
    ///
    /// Lines that are not responses, or answer another id, are skipped.
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest::new(id, method, params);

        let mut transport = self.transport.lock().await;
        transport.write_message(&request).await?;

        loop {
            let line = transport.read_line().await?.ok_or_else(|| {
                TasksError::Mcp(format!("tool server closed the connection during {method}"))
            })?;

            let response = match serde_json::from_str::<JsonRpcResponse>(&line) {
                Ok(response) if response.result.is_some() || response.error.is_some() => response,
                _ => {
                    tracing::debug!(target: "tasks_mcp.mcp.client", %line, "skipping non-response line");
                    continue;
                }
            };

            if response.id != Some(Value::from(id)) {
                tracing::debug!(target: "tasks_mcp.mcp.client", id = ?response.id, "skipping response for another request");
                continue;
            }

            if let Some(error) = response.error {
                return Err(TasksError::Mcp(format!("{method} failed: {error}")));
            }
            return Ok(response.result.unwrap_or(Value::Null));
        }
    }

    /// Send a notification (no response expected).
    pub async fn notify(&self, method: &str) -> Result<()> {
        let mut transport = self.transport.lock().await;
        transport
            .write_message(&JsonRpcRequest::notification(method))
            .await
    }

    /// Close the server's stdin and wait for the child to exit.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            transport, child, ..
        } = self;
        drop(transport);
        if let Some(mut child) = child {
            let status = child.wait().await?;
            tracing::debug!(target: "tasks_mcp.mcp.client", %status, "tool server exited");
        }
        Ok(())
    }
}

#[async_trait]
impl ToolInvoker for McpClient {
    async fn invoke(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
        self.call_tool(name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

    /// Scripted server: answers each request line with the given responses.
    async fn scripted(replies: Vec<String>) -> McpClient {
        let (client_side, server_side) = tokio::io::duplex(4096);
        let (client_read, client_write) = tokio::io::split(client_side);
        let (server_read, mut server_write) = tokio::io::split(server_side);

        tokio::spawn(async move {
            let mut lines = BufReader::new(server_read).lines();
            let mut replies = replies.into_iter();
            while let Ok(Some(_)) = lines.next_line().await {
                let Some(reply) = replies.next() else { break };
                server_write.write_all(reply.as_bytes()).await.unwrap();
            }
        });

        McpClient::connect(BufReader::new(client_read), client_write)
    }

    #[tokio::test]
    async fn test_request_skips_unrelated_lines() {
        let client = scripted(vec![concat!(
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/message\",\"params\":{}}\n",
            "garbage\n",
            "{\"jsonrpc\":\"2.0\",\"id\":99,\"result\":{}}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{\"ok\":true}}\n"
        )
        .to_string()])
        .await;

        let result = client.request("ping", None).await.unwrap();
        assert_eq!(result["ok"], true);
    }

    #[tokio::test]
    async fn test_null_result_is_a_response() {
        let client = scripted(vec!["{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":null}\n".to_string()]).await;
        let result = client.request("ping", None).await.unwrap();
        assert!(result.is_null());
    }

    #[tokio::test]
    async fn test_error_response_is_mcp_error() {
        let client = scripted(vec![
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"error\":{\"code\":-32000,\"message\":\"Tool not found: x\"}}\n"
                .to_string(),
        ])
        .await;

        let err = client.call_tool("x", json!({})).await.unwrap_err();
        assert!(matches!(err, TasksError::Mcp(_)));
        assert!(err.to_string().contains("Tool not found: x"));
    }

    #[tokio::test]
    async fn test_closed_connection() {
        let client = scripted(vec![]).await;
        let err = client.ping().await.unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        let err = McpClient::spawn("/nonexistent/tasks-mcp-server", &[]).err().unwrap();
        assert!(matches!(err, TasksError::Mcp(_)));
    }
}
