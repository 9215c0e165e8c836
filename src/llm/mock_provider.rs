// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock LLM provider for testing
//!
//! Replays a scripted sequence of responses and records every request, so
//! the agent loop can be exercised without a real model.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, Result};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, ContentBlockResponse, LlmProvider, StopReason, Usage,
};

/// A mock LLM provider for testing
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    /// Scripted responses, replayed in order; the last one repeats
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_count: Arc<AtomicUsize>,
    recorded_requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A pre-configured response for the mock provider
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub text: String,
    pub tool_calls: Vec<MockToolCall>,
    pub stop_reason: StopReason,
    /// When set, `complete` fails with a server error carrying this message
    pub error: Option<String>,
}

/// A mock tool call
#[derive(Clone, Debug)]
pub struct MockToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl MockResponse {
    /// Plain text answer
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A single tool call with no accompanying text
    pub fn tool_call(name: impl Into<String>, input: Value) -> Self {
        Self {
            text: String::new(),
            tool_calls: vec![],
            stop_reason: StopReason::ToolUse,
            error: None,
        }
        .and_tool_call(name, input)
    }

    /// Add another tool call to this response
    pub fn and_tool_call(mut self, name: impl Into<String>, input: Value) -> Self {
        self.tool_calls.push(MockToolCall {
            id: format!("call_{}", uuid::Uuid::new_v4().simple()),
            name: name.into(),
            input,
        });
        self.stop_reason = StopReason::ToolUse;
        self
    }

    /// Provider failure
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            text: "Mock response".to_string(),
            tool_calls: vec![],
            stop_reason: StopReason::EndTurn,
            error: None,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Arc::new(Mutex::new(vec![MockResponse::default()])),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Always answer with `text`
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_responses(vec![MockResponse::text(text)])
    }

    /// Replay `responses` in order (returned in order, last one repeats)
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        {
            let mut script = lock(&self.responses);
            *script = responses;
        }
        self
    }

    /// Number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        lock(&self.recorded_requests).clone()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.recorded_requests).last().cloned()
    }

    fn next_response(&self) -> MockResponse {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let responses = lock(&self.responses);
        match responses.len() {
            0 => MockResponse::default(),
            len => responses[count.min(len - 1)].clone(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock provider lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        lock(&self.recorded_requests).push(request.clone());

        let response = self.next_response();
        if let Some(message) = response.error {
            return Err(ApiError::ServerError {
                status: 500,
                message,
            }
            .into());
        }

        let mut content = vec![];
        if !response.text.is_empty() {
            content.push(ContentBlockResponse::Text {
                text: response.text,
            });
        }
        for tool_call in response.tool_calls {
            content.push(ContentBlockResponse::ToolUse {
                id: tool_call.id,
                name: tool_call.name,
                input: tool_call.input,
            });
        }

        Ok(CompletionResponse {
            id: format!("msg_{}", uuid::Uuid::new_v4().simple()),
            model: request.model,
            content,
            stop_reason: Some(response.stop_reason),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }
}
