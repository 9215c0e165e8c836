// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Groq API provider implementation
//!
//! Groq serves open-weight models behind an OpenAI-compatible chat
//! completions endpoint.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ApiError, Result, TasksError};
use crate::llm::message::{ContentBlock, Message, MessageContent, Role};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, ContentBlockResponse, LlmProvider, StopReason,
    ToolDefinition, Usage,
};

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Groq chat completions provider
pub struct GroqProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GroqProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, GROQ_API_URL)
    }

    /// Create with a custom endpoint (tests, proxies)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Convert internal messages to the OpenAI wire format
    fn convert_messages(&self, messages: &[Message], system: Option<&str>) -> Vec<GroqMessage> {
        let mut result = Vec::new();

        if let Some(sys) = system {
            result.push(GroqMessage::text("system", sys));
        }

        for m in messages {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };

            let blocks = match &m.content {
                MessageContent::Text(text) => {
                    result.push(GroqMessage::text(role, text));
                    continue;
                }
                MessageContent::Blocks(blocks) => blocks,
            };

            let mut text_parts = Vec::new();
            let mut tool_calls = Vec::new();
            let mut tool_results = Vec::new();

            for block in blocks {
                match block {
                    ContentBlock::Text { text } => text_parts.push(text.as_str()),
                    ContentBlock::ToolUse { id, name, input } => tool_calls.push(GroqToolCall {
                        id: id.clone(),
                        r#type: "function".to_string(),
                        function: GroqFunctionCall {
                            name: name.clone(),
                            arguments: input.to_string(),
                        },
                    }),
                    ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                        is_error,
                    } => {
                        let content = if *is_error {
                            format!("Error: {content}")
                        } else {
                            content.clone()
                        };
                        tool_results.push(GroqMessage {
                            role: "tool".to_string(),
                            content: Some(content),
                            tool_calls: None,
                            tool_call_id: Some(tool_use_id.clone()),
                        });
                    }
                }
            }

            if !text_parts.is_empty() || !tool_calls.is_empty() {
                result.push(GroqMessage {
                    role: role.to_string(),
                    content: (!text_parts.is_empty()).then(|| text_parts.join("\n")),
                    tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                    tool_call_id: None,
                });
            }

            // Each tool result is its own `tool` message
            result.extend(tool_results);
        }

        result
    }

    fn convert_tools(&self, tools: &[ToolDefinition]) -> Vec<GroqTool> {
        tools
            .iter()
            .map(|t| GroqTool {
                r#type: "function".to_string(),
                function: GroqFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: serde_json::json!({
                        "type": t.input_schema.schema_type,
                        "properties": t.input_schema.properties,
                        "required": t.input_schema.required,
                    }),
                },
            })
            .collect()
    }

    fn build_request(&self, request: &CompletionRequest) -> GroqRequest {
        let has_tools = !request.tools.is_empty();

        GroqRequest {
            model: request.model.clone(),
            messages: self.convert_messages(&request.messages, request.system.as_deref()),
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            tools: has_tools.then(|| self.convert_tools(&request.tools)),
            tool_choice: has_tools.then(|| "auto".to_string()),
        }
    }

    fn parse_error(&self, status: u16, headers: &HeaderMap, body: &str) -> TasksError {
        let message = serde_json::from_str::<GroqError>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());

        if status == 429 {
            let retry_after = headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map(|secs| secs.ceil() as u32)
                .unwrap_or(60);
            return TasksError::Api(ApiError::RateLimited(retry_after));
        }

        TasksError::Api(ApiError::from_status(status, message))
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request);

        tracing::debug!(
            target: "tasks_mcp.agent",
            model = %body.model,
            messages = body.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TasksError::Api(ApiError::Timeout)
                } else {
                    TasksError::Api(ApiError::Network(e.to_string()))
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status, &headers, &body));
        }

        let api_response: GroqResponse = response
            .json()
            .await
            .map_err(|e| TasksError::Api(ApiError::InvalidResponse(e.to_string())))?;

        let choice = api_response.choices.into_iter().next().ok_or_else(|| {
            TasksError::Api(ApiError::InvalidResponse(
                "No choices in response".to_string(),
            ))
        })?;

        let mut content = Vec::new();

        if let Some(text) = choice.message.content {
            if !text.is_empty() {
                content.push(ContentBlockResponse::Text { text });
            }
        }

        for tc in choice.message.tool_calls.unwrap_or_default() {
            // Models occasionally emit empty or invalid arguments
            let input = serde_json::from_str(&tc.function.arguments)
                .unwrap_or_else(|_| serde_json::json!({}));
            content.push(ContentBlockResponse::ToolUse {
                id: tc.id,
                name: tc.function.name,
                input,
            });
        }

        let stop_reason = choice.finish_reason.as_deref().map(|r| match r {
            "length" => StopReason::MaxTokens,
            "tool_calls" | "function_call" => StopReason::ToolUse,
            _ => StopReason::EndTurn,
        });

        let usage = api_response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: api_response.id,
            model: api_response.model,
            content,
            stop_reason,
            usage,
        })
    }
}

// Groq API types (OpenAI-compatible format)

#[derive(Debug, Serialize)]
struct GroqRequest {
    model: String,
    messages: Vec<GroqMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GroqTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Serialize)]
struct GroqMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<GroqToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl GroqMessage {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(text.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GroqToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    r#type: String,
    function: GroqFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct GroqFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct GroqTool {
    #[serde(rename = "type")]
    r#type: String,
    function: GroqFunction,
}

#[derive(Debug, Serialize)]
struct GroqFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<GroqChoice>,
    usage: Option<GroqUsage>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqResponseMessage {
    content: Option<String>,
    tool_calls: Option<Vec<GroqToolCall>>,
}

#[derive(Debug, Deserialize)]
struct GroqUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GroqError {
    error: GroqErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GroqErrorDetail {
    message: String,
}
