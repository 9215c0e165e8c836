// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Google Tasks v1 resources and operations

pub mod client;
pub mod models;
pub mod service;

pub use client::TasksClient;
pub use models::{MoveTask, NewTask, Task, TaskList, TaskPatch, TaskStatus};
pub use service::{TaskService, MAX_RESULTS_LIMIT};
