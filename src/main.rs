// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! tasks-mcp: Google Tasks over MCP, with an interactive agent
//!
//! Entry point for the CLI.

use clap::Parser;

use tasks_mcp::cli::{Cli, Commands};
use tasks_mcp::commands;
use tasks_mcp::config::Settings;
use tasks_mcp::error::Result;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "fatal");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries protocol traffic in `serve` mode.
fn init_tracing(verbose: u8) {
    let mut env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // `-v` turns on this crate's diagnostics; `RUST_LOG` directives still apply.
    if verbose > 0 {
        let level = if verbose > 1 { "trace" } else { "debug" };
        if let Ok(directive) = format!("tasks_mcp={level}").parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    let settings = match &config_path {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Settings::ensure_directories()?;

    match cli.command_or_default() {
        Commands::Serve => commands::serve::execute(&settings).await,
        Commands::Chat(args) => {
            commands::chat::execute(args, &settings, config_path.as_deref()).await
        }
        Commands::Login => commands::login::execute(&settings).await,
    }
}
