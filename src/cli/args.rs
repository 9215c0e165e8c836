// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Google Tasks over the Model Context Protocol
#[derive(Parser, Debug)]
#[command(name = "tasks-mcp")]
#[command(version, about = "Google Tasks tools over MCP, with an interactive agent")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the task tools over MCP on stdin/stdout
    Serve,

    /// Start an interactive chat session (default when no command given)
    Chat(ChatArgs),

    /// Run the OAuth consent flow and store the token
    Login,
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Command that starts the MCP tool server (defaults to this binary's `serve`)
    #[arg(long, value_name = "PROGRAM")]
    pub server_command: Option<String>,

    /// Argument for the server command (repeatable)
    #[arg(long = "server-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub server_arg: Vec<String>,
}

impl Cli {
    /// The subcommand to run; `chat` when none was given
    pub fn command_or_default(self) -> Commands {
        self.command
            .unwrap_or_else(|| Commands::Chat(ChatArgs::default()))
    }
}
