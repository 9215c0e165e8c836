// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Message types for LLM interactions
//!
//! Provider-neutral messages; each provider converts them to its wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,

    /// Role of the message sender
    pub role: Role,

    pub content: MessageContent,

    pub timestamp: DateTime<Utc>,
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Content of a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content
    Text(String),
    /// Multiple content blocks (text, tool use, tool result)
    Blocks(Vec<ContentBlock>),
}

/// A block of content within a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },

    /// Tool use request from assistant
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Tool result sent back on the user's side
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl Message {
    fn with_content(role: Role, content: MessageContent) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_content(Role::User, MessageContent::Text(content.into()))
    }

    /// Assistant message carrying text and/or tool calls
    pub fn assistant_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self::with_content(Role::Assistant, MessageContent::Blocks(blocks))
    }

    /// Tool results for one assistant turn, in call order
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self::with_content(Role::User, MessageContent::Blocks(results))
    }

    /// A single tool result message
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self::tool_results(vec![ContentBlock::tool_result(
            tool_use_id,
            content,
            is_error,
        )])
    }

    /// First text content of the message
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Blocks(blocks) => blocks.iter().find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            }),
        }
    }

    /// All tool use blocks in the message
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        match &self.content {
            MessageContent::Text(_) => vec![],
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
                .collect(),
        }
    }

    pub fn has_tool_use(&self) -> bool {
        !self.tool_uses().is_empty()
    }
}

impl ContentBlock {
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error,
        }
    }
}

/// Conversation history for a single agent turn
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub messages: Vec<Message>,

    pub system_prompt: Option<String>,
}

impl Conversation {
    /// Create a conversation with a system prompt
    pub fn with_system(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![],
            system_prompt: Some(system_prompt.into()),
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), Some("Hello"));

        let reply = Message::assistant_blocks(vec![ContentBlock::Text {
            text: "Hi".to_string(),
        }]);
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.text(), Some("Hi"));
    }

    #[test]
    fn test_assistant_blocks_tool_uses() {
        let msg = Message::assistant_blocks(vec![
            ContentBlock::Text {
                text: "Let me look".to_string(),
            },
            ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: "list_tasks".to_string(),
                input: json!({"tasklist_id": "L1"}),
            },
        ]);

        assert_eq!(msg.text(), Some("Let me look"));
        assert!(msg.has_tool_use());
        assert_eq!(msg.tool_uses().len(), 1);
        assert!(!Message::user("x").has_tool_use());
    }

    #[test]
    fn test_tool_result_serialization() {
        let ok = serde_json::to_value(ContentBlock::tool_result("call_1", "done", false)).unwrap();
        assert_eq!(ok["type"], "tool_result");
        assert!(ok.get("is_error").is_none());

        let err = serde_json::to_value(ContentBlock::tool_result("call_2", "boom", true)).unwrap();
        assert_eq!(err["is_error"], true);

        let msg = Message::tool_result("call_1", "done", false);
        assert_eq!(msg.role, Role::User);
        assert!(matches!(msg.content, MessageContent::Blocks(ref blocks) if blocks.len() == 1));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), "assistant");
    }

    #[test]
    fn test_conversation() {
        let mut conversation = Conversation::with_system("You manage tasks");
        assert!(conversation.messages.is_empty());

        conversation.push(Message::user("Add milk"));
        conversation.push(Message::user("Thanks"));

        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].text(), Some("Thanks"));
        assert_eq!(conversation.system_prompt.as_deref(), Some("You manage tasks"));
    }
}
