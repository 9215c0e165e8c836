// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! In-memory fake of the Tasks REST API, served by wiremock.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use tasks_mcp::auth::Session;
use tasks_mcp::tasks::{TaskService, TasksClient};

#[derive(Default)]
struct State {
    next_id: u32,
    /// (list, tasks) in creation order
    lists: Vec<(Value, Vec<Value>)>,
}

impl State {
    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn list_index(&self, id: &str) -> Option<usize> {
        self.lists.iter().position(|(list, _)| list["id"] == id)
    }
}

/// Stateful responder understanding the task list and task endpoints
#[derive(Clone, Default)]
pub struct FakeTasksApi {
    state: Arc<Mutex<State>>,
}

fn not_found(what: &str) -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": {"code": 404, "message": format!("{what} not found"), "status": "NOT_FOUND"}
    }))
}

fn ok(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(value)
}

fn body(request: &Request) -> Map<String, Value> {
    serde_json::from_slice::<Value>(&request.body)
        .ok()
        .and_then(|v| v.as_object().cloned())
        .unwrap_or_default()
}

impl Respond for FakeTasksApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| s.map(str::to_string).collect())
            .unwrap_or_default();
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let method = request.method.as_str();

        match (method, segments.as_slice()) {
            ("GET", ["users", "@me", "lists"]) => {
                let items: Vec<Value> = state.lists.iter().map(|(l, _)| l.clone()).collect();
                ok(json!({"kind": "tasks#taskLists", "items": items}))
            }
            ("POST", ["users", "@me", "lists"]) => {
                let id = state.id("list-");
                let list = json!({
                    "kind": "tasks#taskList",
                    "id": id,
                    "title": body(request).get("title").cloned().unwrap_or(Value::Null),
                    "updated": "2025-01-01T00:00:00.000Z"
                });
                state.lists.push((list.clone(), vec![]));
                ok(list)
            }
            (m, ["users", "@me", "lists", id]) => {
                let Some(index) = state.list_index(id) else {
                    return not_found("Task list");
                };
                match m {
                    "GET" => ok(state.lists[index].0.clone()),
                    "PUT" | "PATCH" => {
                        if let Some(title) = body(request).get("title") {
                            state.lists[index].0["title"] = title.clone();
                        }
                        ok(state.lists[index].0.clone())
                    }
                    "DELETE" => {
                        state.lists.remove(index);
                        ResponseTemplate::new(204)
                    }
                    _ => ResponseTemplate::new(405),
                }
            }
            (m, ["lists", list_id, rest @ ..]) => {
                let Some(index) = state.list_index(list_id) else {
                    return not_found("Task list");
                };
                match (m, rest) {
                    ("GET", ["tasks"]) => {
                        let items = state.lists[index].1.clone();
                        ok(json!({"kind": "tasks#tasks", "items": items}))
                    }
                    ("POST", ["tasks"]) => {
                        let id = state.id("task-");
                        let mut task = body(request);
                        task.insert("kind".to_string(), json!("tasks#task"));
                        task.insert("id".to_string(), json!(id));
                        task.insert("status".to_string(), json!("needsAction"));
                        task.insert("position".to_string(), json!("00000000000000000000"));
                        let task = Value::Object(task);
                        state.lists[index].1.push(task.clone());
                        ok(task)
                    }
                    ("POST", ["clear"]) => {
                        state.lists[index].1.retain(|t| t["status"] != "completed");
                        ResponseTemplate::new(204)
                    }
                    (m, ["tasks", task_id, tail @ ..]) => {
                        let tasks = &mut state.lists[index].1;
                        let Some(pos) = tasks.iter().position(|t| t["id"] == *task_id) else {
                            return not_found("Task");
                        };
                        match (m, tail) {
                            ("GET", []) => ok(tasks[pos].clone()),
                            ("PUT", []) => {
                                let mut updated = body(request);
                                updated.insert("id".to_string(), json!(task_id));
                                tasks[pos] = Value::Object(updated);
                                ok(tasks[pos].clone())
                            }
                            ("DELETE", []) => {
                                tasks.remove(pos);
                                ResponseTemplate::new(204)
                            }
                            ("POST", ["move"]) => {
                                let parent = request
                                    .url
                                    .query_pairs()
                                    .find(|(k, _)| k == "parent")
                                    .map(|(_, v)| v.into_owned());
                                match parent {
                                    Some(parent) => tasks[pos]["parent"] = json!(parent),
                                    None => {
                                        if let Some(task) = tasks[pos].as_object_mut() {
                                            task.remove("parent");
                                        }
                                    }
                                }
                                ok(tasks[pos].clone())
                            }
                            _ => ResponseTemplate::new(405),
                        }
                    }
                    _ => not_found("Resource"),
                }
            }
            _ => not_found("Resource"),
        }
    }
}

/// Start a wiremock server backed by a fresh fake API.
pub async fn fake_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(FakeTasksApi::default())
        .mount(&server)
        .await;
    server
}

/// Service whose session is already holding a handle for `base_url`.
pub fn service_for(base_url: &str) -> Arc<TaskService> {
    let client = TasksClient::with_token(base_url, "test-token").unwrap();
    Arc::new(TaskService::new(Arc::new(Session::with_handle(client))))
}
