// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Task tools

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::tasklists::default_max_results;
use crate::error::Result;
use crate::llm::provider::ToolDefinition;
use crate::tasks::models::empty_as_none;
use crate::tasks::{MoveTask, NewTask, TaskPatch, TaskService, TaskStatus};
use crate::tools::{parse_args, SchemaBuilder, Tool, ToolResult};

const TASKLIST_ID: &str = "The ID of the task list";
const RFC3339_HINT: &str = "RFC 3339 timestamp, e.g. 2025-03-05T00:00:00Z";

#[derive(Deserialize)]
struct TaskRefArgs {
    tasklist_id: String,
    task_id: String,
}

/// Tool for listing tasks in a task list
pub struct ListTasksTool {
    service: Arc<TaskService>,
}

impl ListTasksTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct ListTasksArgs {
    tasklist_id: String,
    #[serde(default = "default_max_results")]
    max_results: u32,
}

#[async_trait]
impl Tool for ListTasksTool {
    fn name(&self) -> &str {
        "list_tasks"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "list_tasks".to_string(),
            description: "Retrieve the tasks in a task list.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .integer("max_results", "Maximum number of tasks to return", (1, 100), Some(100), false)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: ListTasksArgs = parse_args(self.name(), input)?;
        let outcome = self
            .service
            .list_tasks(&args.tasklist_id, args.max_results)
            .await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for fetching one task
pub struct GetTaskTool {
    service: Arc<TaskService>,
}

impl GetTaskTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for GetTaskTool {
    fn name(&self) -> &str {
        "get_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_task".to_string(),
            description: "Retrieve a specific task by its ID from a task list.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .string("task_id", "The ID of the task to retrieve", true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: TaskRefArgs = parse_args(self.name(), input)?;
        let outcome = self.service.get_task(&args.tasklist_id, &args.task_id).await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for creating a task
pub struct CreateTaskTool {
    service: Arc<TaskService>,
}

impl CreateTaskTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct CreateTaskArgs {
    tasklist_id: String,
    title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    notes: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    due: Option<DateTime<Utc>>,
}

#[async_trait]
impl Tool for CreateTaskTool {
    fn name(&self) -> &str {
        "create_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "create_task".to_string(),
            description: "Create a new task in a task list.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .string("title", "The title of the new task", true)
                .string("notes", "Additional notes for the task", false)
                .date_time("due", &format!("Due date as an {RFC3339_HINT}"), false)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: CreateTaskArgs = parse_args(self.name(), input)?;
        let task = NewTask {
            title: args.title,
            notes: args.notes,
            due: args.due,
        };
        let outcome = self.service.create_task(&args.tasklist_id, task).await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for partially updating a task
pub struct UpdateTaskTool {
    service: Arc<TaskService>,
}

impl UpdateTaskTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct UpdateTaskArgs {
    tasklist_id: String,
    task_id: String,
    #[serde(flatten)]
    patch: TaskPatch,
}

#[async_trait]
impl Tool for UpdateTaskTool {
    fn name(&self) -> &str {
        "update_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "update_task".to_string(),
            description: "Update an existing task. Only the fields provided are changed.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .string("task_id", "The ID of the task to update", true)
                .string("title", "New title for the task", false)
                .string("notes", "New notes for the task", false)
                .date_time("due", &format!("New due date as an {RFC3339_HINT}"), false)
                .string_enum(
                    "status",
                    "New status for the task",
                    &[TaskStatus::NeedsAction.as_str(), TaskStatus::Completed.as_str()],
                    false,
                )
                .date_time("completed", &format!("Completion date as an {RFC3339_HINT}"), false)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: UpdateTaskArgs = parse_args(self.name(), input)?;
        let outcome = self
            .service
            .update_task(&args.tasklist_id, &args.task_id, args.patch)
            .await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for marking a task completed now
pub struct MarkTaskCompletedTool {
    service: Arc<TaskService>,
}

impl MarkTaskCompletedTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for MarkTaskCompletedTool {
    fn name(&self) -> &str {
        "mark_task_completed"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "mark_task_completed".to_string(),
            description: "Mark a specific task as completed, stamped with the current time.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .string("task_id", "The ID of the task to mark as completed", true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: TaskRefArgs = parse_args(self.name(), input)?;
        let outcome = self
            .service
            .mark_task_completed(&args.tasklist_id, &args.task_id)
            .await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for deleting a task
pub struct DeleteTaskTool {
    service: Arc<TaskService>,
}

impl DeleteTaskTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for DeleteTaskTool {
    fn name(&self) -> &str {
        "delete_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "delete_task".to_string(),
            description: "Delete a task from a task list.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .string("task_id", "The ID of the task to delete", true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: TaskRefArgs = parse_args(self.name(), input)?;
        let outcome = self
            .service
            .delete_task(&args.tasklist_id, &args.task_id)
            .await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for clearing completed tasks
pub struct ClearCompletedTasksTool {
    service: Arc<TaskService>,
}

impl ClearCompletedTasksTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct ClearArgs {
    tasklist_id: String,
}

#[async_trait]
impl Tool for ClearCompletedTasksTool {
    fn name(&self) -> &str {
        "clear_completed_tasks"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "clear_completed_tasks".to_string(),
            description: "Clear all completed tasks from a task list. Cleared tasks are hidden and no longer returned by default.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: ClearArgs = parse_args(self.name(), input)?;
        let outcome = self.service.clear_completed_tasks(&args.tasklist_id).await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}

/// Tool for repositioning a task
pub struct MoveTaskTool {
    service: Arc<TaskService>,
}

impl MoveTaskTool {
    pub fn new(service: Arc<TaskService>) -> Self {
        Self { service }
    }
}

#[derive(Deserialize)]
struct MoveTaskArgs {
    tasklist_id: String,
    task_id: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    previous: Option<String>,
}

#[async_trait]
impl Tool for MoveTaskTool {
    fn name(&self) -> &str {
        "move_task"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "move_task".to_string(),
            description: "Move a task to a new position. Without parent or previous the task moves to the top level, first position.".to_string(),
            input_schema: SchemaBuilder::new()
                .string("tasklist_id", TASKLIST_ID, true)
                .string("task_id", "The ID of the task to move", true)
                .string("parent", "The new parent task ID", false)
                .string("previous", "The task ID to place this task after", false)
                .build(),
        }
    }

    async fn execute(&self, tool_use_id: String, input: Value) -> Result<ToolResult> {
        let args: MoveTaskArgs = parse_args(self.name(), input)?;
        let target = MoveTask {
            parent: args.parent,
            previous: args.previous,
        };
        let outcome = self
            .service
            .move_task(&args.tasklist_id, &args.task_id, target)
            .await;
        ToolResult::from_outcome(tool_use_id, outcome)
    }
}
