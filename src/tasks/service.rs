// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Task list and task operations
//!
//! Each operation fetches the session handle and makes one remote call
//! (two for the read-modify-write updates). Nothing is cached locally.

use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;

use crate::auth::Session;
use crate::error::{Result, TasksError};

use super::models::{ListResponse, MoveTask, NewTask, Task, TaskList, TaskPatch, TaskStatus};

/// Largest page the API accepts for list calls
pub const MAX_RESULTS_LIMIT: u32 = 100;

const LISTS: [&str; 3] = ["users", "@me", "lists"];

/// Operations against the user's Google Tasks data
#[derive(Clone)]
pub struct TaskService {
    session: Arc<Session>,
}

impl TaskService {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    // ==================== Task lists ====================

    /// List the user's task lists.
    pub async fn list_tasklists(&self, max_results: u32) -> Result<Vec<TaskList>> {
        let client = self.session.handle().await?;
        let page: ListResponse<TaskList> = client
            .get(&LISTS, &[("maxResults", clamp(max_results).to_string())])
            .await?;
        tracing::debug!(target: "tasks_mcp.tasks", count = page.items.len(), "listed task lists");
        Ok(page.items)
    }

    pub async fn get_tasklist(&self, tasklist_id: &str) -> Result<TaskList> {
        require("tasklist_id", tasklist_id)?;
        let client = self.session.handle().await?;
        client.get(&tasklist_path(tasklist_id), &[]).await
    }

    pub async fn create_tasklist(&self, title: &str) -> Result<TaskList> {
        require("title", title)?;
        let client = self.session.handle().await?;
        let created: TaskList = client
            .send(Method::POST, &LISTS, &json!({ "title": title }))
            .await?;
        tracing::info!(target: "tasks_mcp.tasks", id = %created.id, "created task list");
        Ok(created)
    }

    /// Rename a task list.
    pub async fn update_tasklist(&self, tasklist_id: &str, title: &str) -> Result<TaskList> {
        require("tasklist_id", tasklist_id)?;
        require("title", title)?;
        let client = self.session.handle().await?;
        client
            .send(
                Method::PUT,
                &tasklist_path(tasklist_id),
                &json!({ "id": tasklist_id, "title": title }),
            )
            .await
    }

    pub async fn delete_tasklist(&self, tasklist_id: &str) -> Result<String> {
        require("tasklist_id", tasklist_id)?;
        let client = self.session.handle().await?;
        client
            .call(Method::DELETE, &tasklist_path(tasklist_id))
            .await?;
        tracing::info!(target: "tasks_mcp.tasks", id = %tasklist_id, "deleted task list");
        Ok(format!("Task list {tasklist_id} deleted successfully."))
    }

    // ==================== Tasks ====================

    /// List tasks in a task list.
    pub async fn list_tasks(&self, tasklist_id: &str, max_results: u32) -> Result<Vec<Task>> {
        require("tasklist_id", tasklist_id)?;
        let client = self.session.handle().await?;
        let page: ListResponse<Task> = client
            .get(
                &["lists", tasklist_id, "tasks"],
                &[("maxResults", clamp(max_results).to_string())],
            )
            .await?;
        tracing::debug!(target: "tasks_mcp.tasks", count = page.items.len(), "listed tasks");
        Ok(page.items)
    }

    pub async fn get_task(&self, tasklist_id: &str, task_id: &str) -> Result<Task> {
        require("tasklist_id", tasklist_id)?;
        require("task_id", task_id)?;
        let client = self.session.handle().await?;
        client.get(&task_path(tasklist_id, task_id), &[]).await
    }

    pub async fn create_task(&self, tasklist_id: &str, task: NewTask) -> Result<Task> {
        require("tasklist_id", tasklist_id)?;
        require("title", &task.title)?;
        let client = self.session.handle().await?;
        let created: Task = client
            .send(Method::POST, &["lists", tasklist_id, "tasks"], &task)
            .await?;
        tracing::info!(target: "tasks_mcp.tasks", id = %created.id, "created task");
        Ok(created)
    }

    /// Fetch the task, overlay the patch, and write the whole task back.
    pub async fn update_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<Task> {
        require("tasklist_id", tasklist_id)?;
        require("task_id", task_id)?;
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TasksError::InvalidInput("title must not be empty".to_string()));
        }

        let client = self.session.handle().await?;
        let path = task_path(tasklist_id, task_id);
        let mut task: Task = client.get(&path, &[]).await?;
        patch.apply(&mut task);
        client.send(Method::PUT, &path, &task).await
    }

    /// Set status to completed with the current UTC time.
    pub async fn mark_task_completed(&self, tasklist_id: &str, task_id: &str) -> Result<Task> {
        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            completed: Some(Utc::now()),
            ..TaskPatch::default()
        };
        self.update_task(tasklist_id, task_id, patch).await
    }

    pub async fn delete_task(&self, tasklist_id: &str, task_id: &str) -> Result<String> {
        require("tasklist_id", tasklist_id)?;
        require("task_id", task_id)?;
        let client = self.session.handle().await?;
        client
            .call(Method::DELETE, &task_path(tasklist_id, task_id))
            .await?;
        Ok(format!(
            "Task {task_id} deleted successfully from task list {tasklist_id}."
        ))
    }

    /// Hide all completed tasks in a list.
    pub async fn clear_completed_tasks(&self, tasklist_id: &str) -> Result<String> {
        require("tasklist_id", tasklist_id)?;
        let client = self.session.handle().await?;
        client
            .call(Method::POST, &["lists", tasklist_id, "clear"])
            .await?;
        Ok(format!("Completed tasks cleared from list {tasklist_id}."))
    }

    /// Reposition a task under `parent`, after `previous`.
    pub async fn move_task(
        &self,
        tasklist_id: &str,
        task_id: &str,
        target: MoveTask,
    ) -> Result<Task> {
        require("tasklist_id", tasklist_id)?;
        require("task_id", task_id)?;
        let client = self.session.handle().await?;
        let mut path = task_path(tasklist_id, task_id).to_vec();
        path.push("move");
        client.post_query(&path, &target.query()).await
    }
}

fn clamp(max_results: u32) -> u32 {
    max_results.clamp(1, MAX_RESULTS_LIMIT)
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TasksError::InvalidInput(format!("{name} must not be empty")));
    }
    Ok(())
}

fn tasklist_path(tasklist_id: &str) -> [&str; 4] {
    ["users", "@me", "lists", tasklist_id]
}

fn task_path<'a>(tasklist_id: &'a str, task_id: &'a str) -> [&'a str; 4] {
    ["lists", tasklist_id, "tasks", task_id]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TasksClient;

    fn offline_service() -> TaskService {
        let client = TasksClient::with_token("http://127.0.0.1:1", "t").unwrap();
        TaskService::new(Arc::new(Session::with_handle(client)))
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0), 1);
        assert_eq!(clamp(50), 50);
        assert_eq!(clamp(500), 100);
    }

    #[tokio::test]
    async fn test_empty_ids_rejected_before_network() {
        let service = offline_service();

        let err = service.get_tasklist("").await.unwrap_err();
        assert_eq!(err.kind(), "invalid_request");

        let err = service.get_task("list", "  ").await.unwrap_err();
        assert!(err.to_string().contains("task_id"));

        let err = service.create_tasklist("").await.unwrap_err();
        assert!(err.to_string().contains("title"));

        let err = service
            .create_task("list", NewTask::new(""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[tokio::test]
    async fn test_blank_title_patch_rejected() {
        let service = offline_service();
        let patch = TaskPatch {
            title: Some(" ".to_string()),
            ..TaskPatch::default()
        };
        let err = service.update_task("l", "t", patch).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_typed_error() {
        let service = offline_service();
        let err = service.list_tasklists(10).await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
