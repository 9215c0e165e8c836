// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io;
use tasks_mcp::error::{ApiError, TasksError};

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: TasksError = io_error.into();

    match error {
        TasksError::Io(_) => {} // Expected
        _ => panic!("Expected Io error, got different error type"),
    }
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: TasksError = json_error.into();
    assert!(matches!(error, TasksError::Json(_)));
    assert_eq!(error.kind(), "invalid_response");
}

#[test]
fn test_config_error_display() {
    let error = TasksError::Config("Missing credentials.json".to_string());
    assert_eq!(error.to_string(), "Configuration error: Missing credentials.json");
}

#[test]
fn test_auth_error_display() {
    let error = TasksError::Auth("refresh token revoked".to_string());
    assert_eq!(error.to_string(), "Authentication error: refresh token revoked");
    assert_eq!(error.kind(), "auth");
}

#[test]
fn test_api_rate_limited_error() {
    let error = ApiError::RateLimited(30);
    assert_eq!(error.to_string(), "Rate limited: retry after 30 seconds");
}

#[test]
fn test_status_classification() {
    let cases = [
        (401, "unauthenticated"),
        (403, "permission_denied"),
        (404, "not_found"),
        (400, "invalid_request"),
        (409, "invalid_request"),
        (412, "invalid_request"),
        (429, "rate_limited"),
        (500, "server_error"),
        (503, "server_error"),
    ];

    for (status, kind) in cases {
        assert_eq!(ApiError::from_status(status, "boom").kind(), kind, "status {status}");
    }
}

#[test]
fn test_server_error_keeps_status_and_message() {
    let error = ApiError::from_status(502, "Bad gateway");
    assert_eq!(error.to_string(), "API error (502): Bad gateway");
}

#[test]
fn test_api_error_wraps_into_tasks_error() {
    let error: TasksError = ApiError::NotFound("Task list not found".to_string()).into();
    assert_eq!(error.to_string(), "API error: Not found: Task list not found");
    assert_eq!(error.kind(), "not_found");
}

#[test]
fn test_invalid_input_shares_kind_with_bad_request() {
    let error = TasksError::InvalidInput("title must not be empty".to_string());
    assert_eq!(error.kind(), ApiError::InvalidRequest(String::new()).kind());
}

#[test]
fn test_timeout_error() {
    let error = ApiError::Timeout;
    assert_eq!(error.to_string(), "Request timed out");
    assert_eq!(TasksError::from(error).kind(), "timeout");
}

#[test]
fn test_result_type_alias() {
    fn returns_ok() -> tasks_mcp::Result<i32> {
        Ok(42)
    }

    fn returns_err() -> tasks_mcp::Result<i32> {
        Err(TasksError::Agent("no final answer".to_string()))
    }

    assert_eq!(returns_ok().unwrap(), 42);
    assert!(returns_err().is_err());
}
