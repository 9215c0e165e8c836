// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Task list tools
//!
//! Task lists are the named categories that group tasks together.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::llm::provider::ToolDefinition;
use crate::tasks::{TaskService, MAX_RESULTS_LIMIT};
use crate::tools::{parse_args, SchemaBuilder, Tool, ToolResult};

pub(crate) fn default_max_results() -> u32 {
    MAX_RESULTS_LIMIT
}

/// Tool for listing all task lists
pub struct ListTaskListsTool {
    service: Arc<TaskService>,
}

impl ListTaskListsTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct ListTaskListsArgs {
    #[serde(default = "default_max_results")]
    max_results: u32,
}

#[async_trait]
impl Tool for ListTaskListsTool {
    fn name(&self) -> &str {
        "list_tasklists"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_tasklists".to_string(),
            description: "Retrieve all task lists for the authenticated user. Task lists are the categories that group tasks together.".to_string(),
            input_schema: SchemaBuilder::new()
                .integer("max_results", "Maximum number of task lists to return", (1, 100), Some(100), false)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: ListTaskListsArgs = parse_args(self.name(), input)?;
        ToolResult::from_outcome(tool_use_id, self.service.list_tasklists(args.max_results).await)
    }
}

#[derive(Deserialize)]
struct TaskListIdArgs {
    tasklist_id: String,
}

/// Tool for fetching one task list
pub struct GetTaskListTool {
    service: Arc<TaskService>,
}

impl GetTaskListTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetTaskListTool {
    fn name(&self) -> &str {
        "get_tasklist"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_tasklist".to_string(),
            description: "Retrieve a specific task list by its ID.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", "The ID of the task list to retrieve", true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: TaskListIdArgs = parse_args(self.name(), input)?;
        ToolResult::from_outcome(tool_use_id, self.service.get_tasklist(&args.tasklist_id).await)
    }
}

/// Tool for creating a task list
pub struct CreateTaskListTool {
    service: Arc<TaskService>,
}

impl CreateTaskListTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct CreateTaskListArgs {
    title: String,
}

#[async_trait]
impl Tool for CreateTaskListTool {
    fn name(&self) -> &str {
        "create_tasklist"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "create_tasklist".to_string(),
            description: "Create a new task list. Returns the created task list including its ID.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("title", "The title of the new task list", true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: CreateTaskListArgs = parse_args(self.name(), input)?;
        ToolResult::from_outcome(tool_use_id, self.service.create_tasklist(&args.title).await)
    }
}

/// Tool for renaming a task list
pub struct UpdateTaskListTool {
    service: Arc<TaskService>,
}

impl UpdateTaskListTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct UpdateTaskListArgs {
    tasklist_id: String,
    title: String,
}

#[async_trait]
impl Tool for UpdateTaskListTool {
    fn name(&self) -> &str {
        "update_tasklist"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "update_tasklist".to_string(),
            description: "Update the title of an existing task list.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", "The ID of the task list to update", true)
                .string("title", "The new title for the task list", true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: UpdateTaskListArgs = parse_args(self.name(), input)?;
        let outcome = self
            .service
            .update_tasklist(&args.tasklist_id, &args.title)
            .await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for deleting a task list
pub struct DeleteTaskListTool {
    service: Arc<TaskService>,
}

impl DeleteTaskListTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for DeleteTaskListTool {
    fn name(&self) -> &str {
        "delete_tasklist"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "delete_tasklist".to_string(),
            description: "Delete a task list and all tasks in it.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", "The ID of the task list to delete", true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: TaskListIdArgs = parse_args(self.name(), input)?;
        ToolResult::from_outcome(
            tool_use_id,
            self.service.delete_tasklist(&args.tasklist_id).await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Session;
    use crate::tasks::TasksClient;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(uri: &str) -> Arc<TaskService> {
        let client = TasksClient::with_token(uri, "t").unwrap();
        Arc::new(TaskService::new(Arc::new(Session::with_handle(client))))
    }

    #[tokio::test]
    async fn test_list_tasklists_default_max_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/@me/lists"))
            .and(query_param("maxResults", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{"id": "l1", "title": "Groceries", "kind": "tasks#taskList"}]
            })))
            .mount(&server)
            .await;

        let tool = ListTaskListsTool::new(service_for(&server.uri()));
        let result = tool.execute("u1".into(), json!({})).await.unwrap();

        assert!(!result.is_error());
        let lists: Value = serde_json::from_str(result.output_text()).unwrap();
        assert_eq!(lists[0]["title"], "Groceries");
        assert_eq!(lists[0]["kind"], "tasks#taskList");
    }

    #[tokio::test]
    async fn test_delete_tasklist_confirmation() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/users/@me/lists/l9"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let tool = DeleteTaskListTool::new(service_for(&server.uri()));
        let result = tool
            .execute("u1".into(), json!({"tasklist_id": "l9"}))
            .await
            .unwrap();
        assert_eq!(result.output_text(), "Task list l9 deleted successfully.");
    }

    #[tokio::test]
    async fn test_missing_argument_is_err() {
        let tool = GetTaskListTool::new(service_for("http://127.0.0.1:1"));
        let err = tool.execute("u1".into(), json!({})).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[tokio::test]
    async fn test_remote_failure_is_error_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "Insufficient Permission"}
            })))
            .mount(&server)
            .await;

        let tool = GetTaskListTool::new(service_for(&server.uri()));
        let result = tool
            .execute("u1".into(), json!({"tasklist_id": "l1"}))
            .await
            .unwrap();
        assert!(result.is_error());
        let payload: Value = serde_json::from_str(result.output_text()).unwrap();
        assert_eq!(payload["error"]["kind"], "permission_denied");
    }
}
