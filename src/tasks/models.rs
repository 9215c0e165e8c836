// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Google Tasks resources
//!
//! Only the fields the operations touch are typed. Everything else the API
//! returns (`kind`, `etag`, `selfLink`, `links`, ...) is kept in `extra` and
//! written back unchanged.

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named collection of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Completion state of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    NeedsAction,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::NeedsAction => "needsAction",
            TaskStatus::Completed => "completed",
        }
    }
}

/// A single task inside a task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Due date; the API keeps only the date part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: TaskStatus,

    /// When the task was completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,

    /// Parent task id; absent for top-level tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Lexicographic sort key among siblings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Treat a missing field, `null` and `""` alike as "not supplied".
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(value) => T::deserialize(value).map(Some).map_err(de::Error::custom),
    }
}

/// Fields to overwrite on an existing task. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub completed: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_none()
            && self.due.is_none()
            && self.status.is_none()
            && self.completed.is_none()
    }

    /// Overlay the supplied fields onto `task`.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(notes) = self.notes {
            task.notes = Some(notes);
        }
        if let Some(due) = self.due {
            task.due = Some(due);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(completed) = self.completed {
            task.completed = Some(completed);
        }
    }
}

/// Request body for task creation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: None,
            due: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }
}

/// Target position for a move. Both empty means top level, first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveTask {
    pub parent: Option<String>,
    pub previous: Option<String>,
}

impl MoveTask {
    /// Query parameters to send; empty values are omitted.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(parent) = self.parent.as_ref().filter(|p| !p.is_empty()) {
            query.push(("parent", parent.clone()));
        }
        if let Some(previous) = self.previous.as_ref().filter(|p| !p.is_empty()) {
            query.push(("previous", previous.clone()));
        }
        query
    }
}

/// Collection envelope returned by list endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}
