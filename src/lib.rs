// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Google Tasks exposed as Model Context Protocol tools.
//!
//! Two processes share this crate:
//! - `tasks-mcp serve`: an MCP server on stdio offering task list and task
//!   operations backed by the Google Tasks REST API
//! - `tasks-mcp chat`: a REPL that spawns the server, hands its tools to a
//!   chat model, and answers the user's requests with them
//!
//! Layout:
//! - `auth`: OAuth consent, token storage and the lazily built API handle
//! - `tasks`: REST client, wire models and the task operations
//! - `tools`: tool definitions wrapping the operations
//! - `mcp`: JSON-RPC protocol, server and client
//! - `llm`, `agent`, `chat`: model provider, tool loop and REPL

pub mod agent;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;
pub mod tasks;
pub mod tools;

pub use error::{Result, TasksError};
