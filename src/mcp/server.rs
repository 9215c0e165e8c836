// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! MCP server implementation

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::RwLock;

use super::protocol::*;
use super::transport::LineTransport;
use crate::error::{Result, TasksError};
use crate::tools::{ToolOutput, ToolRegistry};

/// MCP server state
pub struct McpServer {
    /// Tools exposed over `tools/list` and `tools/call`
    registry: Arc<ToolRegistry>,
    /// Set once the client sends `notifications/initialized`
    initialized: Arc<RwLock<bool>>,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    /// Serve requests until the input stream closes.
    pub async fn run<R, W>(&self, mut transport: LineTransport<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(target: "tasks_mcp.mcp.server", tools = self.registry.len(), "serving MCP over stdio");

        while let Some(line) = transport.read_line().await? {
            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => {
                    tracing::debug!(target: "tasks_mcp.mcp.server", method = %request.method, "request");
                    self.handle_request(request).await
                }
                Err(e) => {
                    tracing::warn!(target: "tasks_mcp.mcp.server", error = %e, "unparseable message");
                    Some(JsonRpcResponse::failure(None, JsonRpcError::parse_error()))
                }
            };

            if let Some(response) = response {
                transport.write_message(&response).await?;
            }
        }

        tracing::info!(target: "tasks_mcp.mcp.server", "input closed, shutting down");
        Ok(())
    }

    /// Handle one message. Notifications yield no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            self.handle_notification(&request.method).await;
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "ping" => JsonRpcResponse::success(id, Value::Object(serde_json::Map::new())),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::failure(id, JsonRpcError::method_not_found()),
        };
        Some(response)
    }

    async fn handle_notification(&self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                *self.initialized.write().await = true;
                tracing::info!(target: "tasks_mcp.mcp.server", "client initialized");
            }
            other => {
                tracing::debug!(target: "tasks_mcp.mcp.server", method = %other, "ignoring notification");
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: InitializeParams = match parse_params(request.params) {
            Ok(params) => params,
            Err(error) => return JsonRpcResponse::failure(request.id, error),
        };

        tracing::info!(
            target: "tasks_mcp.mcp.server",
            client = %params.client_info.name,
            version = %params.client_info.version,
            protocol = %params.protocol_version,
            "initialize"
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: Implementation::current(),
        };

        to_response(request.id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools: Vec<Tool> = self
            .registry
            .definitions()
            .into_iter()
            .map(Tool::from)
            .collect();

        to_response(request.id, &ToolsListResult { tools })
    }

    /// Handle tools/call request
    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolParams = match parse_params(request.params) {
            Ok(params) => params,
            Err(error) => return JsonRpcResponse::failure(request.id, error),
        };

        let Some(tool) = self.registry.get(&params.name).cloned() else {
            return JsonRpcResponse::failure(
                request.id,
                JsonRpcError::new(TOOL_NOT_FOUND, format!("Tool not found: {}", params.name)),
            );
        };

        tracing::info!(target: "tasks_mcp.mcp.server", tool = %params.name, "calling tool");

        let args = params
            .arguments
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let tool_use_id = uuid::Uuid::new_v4().to_string();

        let result = match tool.execute(tool_use_id, args).await {
            Ok(result) => result,
            Err(TasksError::InvalidInput(message)) => {
                let mut error = JsonRpcError::invalid_params();
                error.message = message;
                return JsonRpcResponse::failure(request.id, error);
            }
            Err(e) => {
                return JsonRpcResponse::failure(
                    request.id,
                    JsonRpcError::new(TOOL_EXECUTION_FAILED, format!("Tool execution failed: {e}")),
                );
            }
        };

        let (text, is_error) = match result.output {
            ToolOutput::Success(s) => (s, None),
            ToolOutput::Error(s) => (s, Some(true)),
        };

        let call_result = CallToolResult {
            content: vec![ToolContent::Text { text }],
            is_error,
        };

        to_response(request.id, &call_result)
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> std::result::Result<T, JsonRpcError> {
    let params = params.ok_or_else(JsonRpcError::invalid_params)?;
    serde_json::from_value(params).map_err(|e| {
        let mut error = JsonRpcError::invalid_params();
        error.data = Some(Value::String(e.to_string()));
        error
    })
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(_) => JsonRpcResponse::failure(id, JsonRpcError::internal_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::tasks::{TaskService, TasksClient};
    use serde_json::json;

    fn server() -> McpServer {
        let client = TasksClient::with_token("http://127.0.0.1:1", "t").unwrap();
        let service = Arc::new(TaskService::new(Arc::new(Session::with_handle(client))));
        McpServer::new(Arc::new(ToolRegistry::with_task_tools(service)))
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest::new(id, method, params)
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server();
        let response = server
            .handle_request(request(
                1,
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test", "version": "0.0.1"}
                })),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "tasks-mcp");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialize_without_params() {
        let response = server()
            .handle_request(request(1, "initialize", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_initialized_notification_has_no_response() {
        let server = server();
        assert!(!server.is_initialized().await);

        let response = server
            .handle_request(JsonRpcRequest::notification("notifications/initialized"))
            .await;
        assert!(response.is_none());
        assert!(server.is_initialized().await);
    }

    #[tokio::test]
    async fn test_ping() {
        let response = server().handle_request(request(7, "ping", None)).await.unwrap();
        assert_eq!(response.id, Some(json!(7)));
        assert_eq!(response.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_tools_list_sorted() {
        let response = server()
            .handle_request(request(2, "tools/list", None))
            .await
            .unwrap();
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();

        assert_eq!(tools.len(), 13);
        assert_eq!(tools[0]["name"], "clear_completed_tasks");
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let response = server()
            .handle_request(request(3, "resources/list", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let response = server()
            .handle_request(request(4, "tools/call", Some(json!({"name": "nope"}))))
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code, TOOL_NOT_FOUND);
        assert!(error.message.contains("nope"));
    }

    #[tokio::test]
    async fn test_malformed_arguments_invalid_params() {
        let response = server()
            .handle_request(request(
                5,
                "tools/call",
                Some(json!({"name": "get_task", "arguments": {"tasklist_id": 5}})),
            ))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_operation_failure_is_error_result() {
        let response = server()
            .handle_request(request(
                6,
                "tools/call",
                Some(json!({"name": "list_tasklists", "arguments": {}})),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        let payload: Value =
            serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(payload["error"]["kind"], "network");
    }

    #[tokio::test]
    async fn test_run_loop_over_lines() {
        let input = concat!(
            "not json\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n",
        );
        let mut output = Vec::new();
        {
            let transport = LineTransport::new(input.as_bytes(), &mut output);
            server().run(transport).await.unwrap();
        }

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], -32700);
        assert_eq!(lines[1]["id"], 1);
    }

    #[tokio::test]
    async fn test_null_id_request_is_answered() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n";
        let mut output = Vec::new();
        {
            let transport = LineTransport::new(input.as_bytes(), &mut output);
            server().run(transport).await.unwrap();
        }

        let response: Value = serde_json::from_str(String::from_utf8(output).unwrap().trim()).unwrap();
        assert!(response["id"].is_null());
        assert_eq!(response["result"], json!({}));
    }
}
