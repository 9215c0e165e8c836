// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Model Context Protocol (MCP) server and client
//!
//! The server exposes the task tools over stdio; the client spawns that
//! server and hands its tools to the agent.

pub mod client;
pub mod protocol;
pub mod server;
pub mod transport;

pub use client::McpClient;
pub use protocol::*;
pub use server::McpServer;
pub use transport::{LineTransport, StdioTransport};
