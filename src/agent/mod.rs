// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Tool-using agent
//!
//! Each user turn starts a fresh conversation. The model is called, any
//! tool calls it requests are run one after another and their results fed
//! back, until it answers without tool calls or the step limit is hit.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::ModelConfig;
use crate::error::{Result, TasksError};
use crate::llm::message::{ContentBlock, Conversation, Message};
use crate::llm::provider::{CompletionRequest, ContentBlockResponse, LlmProvider, ToolDefinition};
use crate::mcp::protocol::CallToolResult;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that manages the user's Google Tasks. \
Use the available tools to look up, create, update, complete, move and delete task lists and \
tasks. Look up ids with the list tools instead of guessing them. Due dates are RFC 3339 \
timestamps. When a tool reports an error, explain it to the user plainly.";

/// Something that can run a named tool
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(&self, name: &str, arguments: Value) -> Result<CallToolResult>;
}

/// Per-turn model settings
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Maximum model calls per user turn
    pub max_steps: usize,
}

impl AgentConfig {
    pub fn from_model_config(config: &ModelConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_steps: config.max_steps,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::from_model_config(&ModelConfig::default())
    }
}

/// A model bound to a set of tools
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    invoker: Arc<dyn ToolInvoker>,
    tools: Vec<ToolDefinition>,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        invoker: Arc<dyn ToolInvoker>,
        tools: Vec<ToolDefinition>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            invoker,
            tools,
            config,
        }
    }

    /// Answer one user message, running tools as the model requests them.
    pub async fn respond(&self, input: &str) -> Result<String> {
        let mut conversation = Conversation::with_system(self.config.system_prompt.clone());
        conversation.push(Message::user(input));

        for step in 1..=self.config.max_steps {
            tracing::debug!(
                target: "tasks_mcp.agent",
                step,
                messages = conversation.messages.len(),
                "calling model"
            );

            let request = CompletionRequest::new(&self.config.model, conversation.messages.clone())
                .with_system(self.config.system_prompt.clone())
                .with_max_tokens(self.config.max_tokens)
                .with_temperature(self.config.temperature)
                .with_tools(self.tools.clone());

            let response = self.provider.complete(request).await?;
            let tool_calls: Vec<(String, String, Value)> = response
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();

            if tool_calls.is_empty() {
                tracing::debug!(target: "tasks_mcp.agent", step, "final answer");
                return Ok(response.text());
            }

            conversation.push(Message::assistant_blocks(
                response.content.into_iter().map(into_block).collect(),
            ));

            let mut results = Vec::with_capacity(tool_calls.len());
            for (id, name, arguments) in tool_calls {
                let (output, is_error) = self.run_tool(&name, arguments).await;
                results.push(ContentBlock::tool_result(id, output, is_error));
            }
            conversation.push(Message::tool_results(results));
        }

        Err(TasksError::Agent(format!(
            "no final answer after {} model calls",
            self.config.max_steps
        )))
    }

    /// Run one tool; failures become error results for the model.
    async fn run_tool(&self, name: &str, arguments: Value) -> (String, bool) {
        tracing::info!(target: "tasks_mcp.agent", tool = %name, "invoking tool");

        match self.invoker.invoke(name, arguments).await {
            Ok(result) => {
                if result.is_error() {
                    tracing::warn!(target: "tasks_mcp.agent", tool = %name, "tool reported an error");
                }
                (result.text(), result.is_error())
            }
            Err(e) => {
                tracing::warn!(target: "tasks_mcp.agent", tool = %name, error = %e, "tool call failed");
                (e.to_string(), true)
            }
        }
    }
}

fn into_block(block: ContentBlockResponse) -> ContentBlock {
    match block {
        ContentBlockResponse::Text { text } => ContentBlock::Text { text },
        ContentBlockResponse::ToolUse { id, name, input } => ContentBlock::ToolUse { id, name, input },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::message::MessageContent;
    use crate::llm::mock_provider::{MockProvider, MockResponse};
    use crate::mcp::protocol::ToolContent;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records calls; `fail` tools return a protocol error, `broken` an isError result
    #[derive(Default)]
    struct RecordingInvoker {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl ToolInvoker for RecordingInvoker {
        async fn invoke(&self, name: &str, arguments: Value) -> Result<CallToolResult> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));
            match name {
                "fail" => Err(TasksError::Mcp("Tool not found: fail".to_string())),
                "broken" => Ok(CallToolResult {
                    content: vec![ToolContent::Text {
                        text: r#"{"error":{"kind":"not_found","message":"gone"}}"#.to_string(),
                    }],
                    is_error: Some(true),
                }),
                _ => Ok(CallToolResult {
                    content: vec![ToolContent::Text {
                        text: format!("{name} ok"),
                    }],
                    is_error: None,
                }),
            }
        }
    }

    fn agent(provider: MockProvider, invoker: Arc<RecordingInvoker>, max_steps: usize) -> Agent {
        let config = AgentConfig {
            max_steps,
            ..AgentConfig::default()
        };
        Agent::new(Arc::new(provider), invoker, vec![], config)
    }

    fn tool_results(message: &Message) -> Vec<(String, bool)> {
        match &message.content {
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| match b {
                    ContentBlock::ToolResult {
                        content, is_error, ..
                    } => Some((content.clone(), *is_error)),
                    _ => None,
                })
                .collect(),
            MessageContent::Text(_) => vec![],
        }
    }

    #[tokio::test]
    async fn test_plain_answer_without_tools() {
        let provider = MockProvider::new().with_response("Hello!");
        let invoker = Arc::new(RecordingInvoker::default());

        let answer = agent(provider.clone(), invoker.clone(), 12)
            .respond("hi")
            .await
            .unwrap();

        assert_eq!(answer, "Hello!");
        assert_eq!(provider.call_count(), 1);
        assert!(invoker.calls.lock().unwrap().is_empty());

        let request = provider.last_request().unwrap();
        assert!(request.system.unwrap().contains("Google Tasks"));
        assert_eq!(request.model, "qwen-qwq-32b");
    }

    #[tokio::test]
    async fn test_tool_calls_run_in_order_and_feed_back() {
        let provider = MockProvider::new().with_responses(vec![
            MockResponse::tool_call("create_tasklist", json!({"title": "Groceries"}))
                .and_tool_call("list_tasklists", json!({})),
            MockResponse::text("Created Groceries."),
        ]);
        let invoker = Arc::new(RecordingInvoker::default());

        let answer = agent(provider.clone(), invoker.clone(), 12)
            .respond("make a groceries list")
            .await
            .unwrap();
        assert_eq!(answer, "Created Groceries.");

        let calls = invoker.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "create_tasklist");
        assert_eq!(calls[0].1["title"], "Groceries");
        assert_eq!(calls[1].0, "list_tasklists");

        let second = &provider.recorded_requests()[1];
        assert_eq!(second.messages.len(), 3);
        assert!(second.messages[1].has_tool_use());
        assert_eq!(
            tool_results(&second.messages[2]),
            vec![
                ("create_tasklist ok".to_string(), false),
                ("list_tasklists ok".to_string(), false)
            ]
        );
    }

    #[tokio::test]
    async fn test_tool_failures_are_fed_back_as_errors() {
        let provider = MockProvider::new().with_responses(vec![
            MockResponse::tool_call("fail", json!({})).and_tool_call("broken", json!({})),
            MockResponse::text("Sorry, that list is gone."),
        ]);
        let invoker = Arc::new(RecordingInvoker::default());

        let answer = agent(provider.clone(), invoker, 12)
            .respond("delete it")
            .await
            .unwrap();
        assert_eq!(answer, "Sorry, that list is gone.");

        let results = tool_results(&provider.recorded_requests()[1].messages[2]);
        assert!(results.iter().all(|(_, is_error)| *is_error));
        assert!(results[0].0.contains("Tool not found"));
        assert!(results[1].0.contains("not_found"));
    }

    #[tokio::test]
    async fn test_step_limit() {
        let provider =
            MockProvider::new().with_responses(vec![MockResponse::tool_call("list_tasklists", json!({}))]);
        let invoker = Arc::new(RecordingInvoker::default());

        let err = agent(provider.clone(), invoker.clone(), 3)
            .respond("loop forever")
            .await
            .unwrap_err();

        assert!(matches!(err, TasksError::Agent(_)));
        assert_eq!(provider.call_count(), 3);
        assert_eq!(invoker.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_each_turn_starts_fresh() {
        let provider = MockProvider::new().with_response("ok");
        let agent = agent(provider.clone(), Arc::new(RecordingInvoker::default()), 12);

        agent.respond("first").await.unwrap();
        agent.respond("second").await.unwrap();

        let last = provider.last_request().unwrap();
        assert_eq!(last.messages.len(), 1);
        assert_eq!(last.messages[0].text(), Some("second"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = MockProvider::new().with_responses(vec![MockResponse::error("model down")]);
        let err = agent(provider, Arc::new(RecordingInvoker::default()), 12)
            .respond("hi")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model down"));
    }
}
