// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Built-in Google Tasks tools

mod tasklists;
mod tasks;

pub use tasklists::{
    CreateTaskListTool, DeleteTaskListTool, GetTaskListTool, ListTaskListsTool, UpdateTaskListTool,
};
pub use tasks::{
    ClearCompletedTasksTool, CreateTaskTool, DeleteTaskTool, GetTaskTool, ListTasksTool,
    MarkTaskCompletedTool, MoveTaskTool, UpdateTaskTool,
};
