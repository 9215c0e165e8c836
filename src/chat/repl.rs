// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Interactive read-eval-print loop around the agent

use std::io::{self, Write};

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::agent::Agent;
use crate::error::Result;

/// What a line of user input asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Exit,
    Clear,
    Empty,
    Prompt(&'a str),
}

impl<'a> ReplCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ReplCommand::Empty;
        }
        match trimmed.to_lowercase().as_str() {
            "exit" | "quit" => ReplCommand::Exit,
            "clear" => ReplCommand::Clear,
            _ => ReplCommand::Prompt(trimmed),
        }
    }
}

/// Line-oriented chat loop over an async reader and a terminal writer
pub struct Repl<R, W> {
    input: R,
    output: W,
}

impl Repl<BufReader<Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Run until `exit`/`quit` or end of input.
    ///
    /// Agent failures are reported and the loop continues; an input read
    /// failure ends it.
    pub async fn run(&mut self, agent: &Agent) -> Result<()> {
        self.banner()?;

        if let Err(e) = self.chat(agent).await {
            tracing::error!(error = %e, "chat loop failed");
            writeln!(self.output, "\nUnexpected error: {e}")?;
        }
        self.output.flush()?;
        Ok(())
    }

    async fn chat(&mut self, agent: &Agent) -> Result<()> {
        let mut line = String::new();
        loop {
            self.label("\nYou: ", Color::Green)?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line).await? == 0 {
                writeln!(self.output)?;
                return Ok(());
            }

            match ReplCommand::parse(&line) {
                ReplCommand::Exit => {
                    writeln!(self.output, "Ending conversation...")?;
                    return Ok(());
                }
                ReplCommand::Clear => {
                    // Turns carry no history, so there is nothing to reset
                    writeln!(self.output, "\nConversation history cleared.")?;
                }
                ReplCommand::Empty => {}
                ReplCommand::Prompt(prompt) => {
                    self.label("\nAssistant: ", Color::Cyan)?;
                    self.output.flush()?;

                    match agent.respond(prompt).await {
                        Ok(answer) => writeln!(self.output, "{answer}")?,
                        Err(e) => {
                            tracing::warn!(target: "tasks_mcp.agent", error = %e, "agent turn failed");
                            writeln!(self.output, "\nError during agent response: {e}")?;
                        }
                    }
                }
            }
        }
    }

    fn banner(&mut self) -> Result<()> {
        self.output.execute(SetForegroundColor(Color::Cyan))?;
        writeln!(self.output, "\n===== Interactive MCP Chat =====")?;
        self.output.execute(ResetColor)?;
        writeln!(self.output, "Type 'exit' or 'quit' to end the conversation")?;
        writeln!(self.output, "Type 'clear' to clear conversation history")?;
        writeln!(self.output, "==================================")?;
        Ok(())
    }

    fn label(&mut self, text: &str, color: Color) -> Result<()> {
        self.output.execute(SetForegroundColor(color))?;
        write!(self.output, "{text}")?;
        self.output.execute(ResetColor)?;
        Ok(())
    }
}
