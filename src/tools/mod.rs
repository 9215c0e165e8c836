// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool system for tasks-mcp
//!
//! Each task operation is wrapped as a named [`Tool`] with a static input
//! schema. The MCP server exposes the registry; the agent only ever sees the
//! tools through MCP.

pub mod builtin;
pub mod definition;

pub use definition::*;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, TasksError};
use crate::llm::provider::ToolDefinition;
use crate::tasks::TaskService;

/// Result of tool execution
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The tool_use_id this result corresponds to
    pub tool_use_id: String,
    /// The output of the tool
    pub output: ToolOutput,
}

/// Output from a tool
#[derive(Debug, Clone)]
pub enum ToolOutput {
    /// Successful output
    Success(String),
    /// Error output
    Error(String),
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_use_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            output: ToolOutput::Success(output.into()),
        }
    }

    /// Create an error result
    pub fn error(tool_use_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_use_id: tool_use_id.into(),
            output: ToolOutput::Error(error.into()),
        }
    }

    /// Wrap an operation outcome: records and lists become JSON text,
    /// confirmation strings pass through, failures become error payloads.
    pub fn from_outcome<T: Serialize>(tool_use_id: impl Into<String>, outcome: Result<T>) -> Result<Self> {
        match outcome {
            Ok(value) => {
                let text = match serde_json::to_value(&value)? {
                    Value::String(s) => s,
                    other => serde_json::to_string_pretty(&other)?,
                };
                Ok(Self::success(tool_use_id, text))
            }
            Err(e) => {
                tracing::debug!(target: "tasks_mcp.mcp.server", kind = e.kind(), error = %e, "operation failed");
                Ok(Self::error(tool_use_id, error_payload(&e)))
            }
        }
    }

    /// Check if this is an error
    pub fn is_error(&self) -> bool {
        matches!(self.output, ToolOutput::Error(_))
    }

    /// Get the output text
    pub fn output_text(&self) -> &str {
        match &self.output {
            ToolOutput::Success(s) => s,
            ToolOutput::Error(s) => s,
        }
    }
}

/// Structured error text: `{"error": {"kind": ..., "message": ...}}`
pub fn error_payload(error: &TasksError) -> String {
    json!({
        "error": {
            "kind": error.kind(),
            "message": error.to_string(),
        }
    })
    .to_string()
}

/// Decode tool arguments; failures are reported as invalid input.
pub fn parse_args<T: DeserializeOwned>(tool: &str, input: Value) -> Result<T> {
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input)
        .map_err(|e| TasksError::InvalidInput(format!("invalid arguments for {tool}: {e}")))
}

/// Trait for implementing tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition for the LLM
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with given input.
    ///
    /// Operation failures are returned as `Ok` with an error output;
    /// `Err` is reserved for arguments that could not be decoded.
    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult>;

    /// Get the tool name
    fn name(&self) -> &str;
}

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry with every task list and task tool
    pub fn with_task_tools(service: Arc<TaskService>) -> Self {
        let mut registry = Self::new();

        // Task lists
        registry.register(Arc::new(builtin::ListTaskListsTool::new(service.clone())));
        registry.register(Arc::new(builtin::GetTaskListTool::new(service.clone())));
        registry.register(Arc::new(builtin::CreateTaskListTool::new(service.clone())));
        registry.register(Arc::new(builtin::UpdateTaskListTool::new(service.clone())));
        registry.register(Arc::new(builtin::DeleteTaskListTool::new(service.clone())));

        // Tasks
        registry.register(Arc::new(builtin::ListTasksTool::new(service.clone())));
        registry.register(Arc::new(builtin::GetTaskTool::new(service.clone())));
        registry.register(Arc::new(builtin::CreateTaskTool::new(service.clone())));
        registry.register(Arc::new(builtin::UpdateTaskTool::new(service.clone())));
        registry.register(Arc::new(builtin::MarkTaskCompletedTool::new(service.clone())));
        registry.register(Arc::new(builtin::DeleteTaskTool::new(service.clone())));
        registry.register(Arc::new(builtin::ClearCompletedTasksTool::new(service.clone())));
        registry.register(Arc::new(builtin::MoveTaskTool::new(service)));

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// All tool definitions, sorted by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// All tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::error::ApiError;
    use crate::tasks::TasksClient;

    fn registry() -> ToolRegistry {
        let client = TasksClient::with_token("http://127.0.0.1:1", "t").unwrap();
        let service = TaskService::new(Arc::new(Session::with_handle(client)));
        ToolRegistry::with_task_tools(Arc::new(service))
    }

    #[test]
    fn test_registry_has_all_task_tools() {
        let registry = registry();
        assert_eq!(registry.len(), 13);
        assert_eq!(
            registry.names(),
            vec![
                "clear_completed_tasks",
                "create_task",
                "create_tasklist",
                "delete_task",
                "delete_tasklist",
                "get_task",
                "get_tasklist",
                "list_tasklists",
                "list_tasks",
                "mark_task_completed",
                "move_task",
                "update_task",
                "update_tasklist",
            ]
        );
    }

    #[test]
    fn test_definitions_sorted_and_described() {
        let definitions = registry().definitions();
        assert_eq!(definitions.first().unwrap().name, "clear_completed_tasks");
        for def in &definitions {
            assert!(!def.description.is_empty(), "{} has no description", def.name);
            assert_eq!(def.input_schema.schema_type, "object");
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.get("list_tasks").is_none());
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("id1", "All good");
        assert!(!result.is_error());
        assert_eq!(result.output_text(), "All good");
        assert_eq!(result.tool_use_id, "id1");
    }

    #[test]
    fn test_from_outcome_string_passes_through() {
        let result =
            ToolResult::from_outcome("id", Ok("Task list x deleted successfully.".to_string()))
                .unwrap();
        assert_eq!(result.output_text(), "Task list x deleted successfully.");
    }

    #[test]
    fn test_from_outcome_record_is_json() {
        let result = ToolResult::from_outcome("id", Ok(json!({"id": "t1"}))).unwrap();
        let value: Value = serde_json::from_str(result.output_text()).unwrap();
        assert_eq!(value["id"], "t1");
    }

    #[test]
    fn test_from_outcome_error_payload() {
        let outcome: Result<Value> = Err(ApiError::NotFound("Task list nope".into()).into());
        let result = ToolResult::from_outcome("id", outcome).unwrap();
        assert!(result.is_error());

        let value: Value = serde_json::from_str(result.output_text()).unwrap();
        assert_eq!(value["error"]["kind"], "not_found");
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Task list nope"));
    }

    #[test]
    fn test_parse_args_reports_tool() {
        #[derive(serde::Deserialize, Debug)]
        struct Args {
            #[allow(dead_code)]
            tasklist_id: String,
        }

        let err = parse_args::<Args>("get_tasklist", json!({})).unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
        assert!(err.to_string().contains("get_tasklist"));
    }
}
