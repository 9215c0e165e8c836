// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! MCP transport layer - newline-delimited JSON
//!
//! MCP servers communicate via stdio using JSON-RPC 2.0, one message per
//! line. The transport is generic so the same code drives a child process
//! pipe or an in-memory duplex stream.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::Result;

/// Line-oriented JSON transport
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Transport bound to this process's stdin and stdout
pub type StdioTransport = LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    pub fn stdio() -> Self {
        LineTransport::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Next non-blank line, without its terminator. `None` at EOF.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    /// Serialize `message` onto one line and flush.
    pub async fn write_message<T: Serialize>(&mut self, message: &T) -> Result<()> {
        let mut json = serde_json::to_string(message)?;
        json.push('\n');
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
