// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use invtrack_app::{Item, ItemId};
use serde_json::{Value, json};
use std::io::Read;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Request, Response, Server};

use crate::fixture_timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body).map_err(|error| anyhow!("decode request body: {error}"))
    }
}

#[derive(Debug, Default)]
struct MockState {
    items: Vec<Item>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    fail_next: Option<(u16, String)>,
}

/// In-memory stand-in for the inventory REST API, served by tiny_http on a
/// loopback port. Requests are handled one at a time and recorded.
pub struct MockApi {
    server: Arc<Server>,
    state: Arc<Mutex<MockState>>,
    handle: Option<JoinHandle<()>>,
}

impl MockApi {
    pub fn start() -> Result<Self> {
        Self::with_items(Vec::new())
    }

    pub fn with_items(items: Vec<Item>) -> Result<Self> {
        let server = Arc::new(
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock API: {error}"))?,
        );
        let next_id = items.iter().map(|item| item.id.get()).max().unwrap_or(0) + 1;
        let state = Arc::new(Mutex::new(MockState {
            items,
            next_id,
            ..MockState::default()
        }));

        let worker_server = Arc::clone(&server);
        let worker_state = Arc::clone(&state);
        let handle = thread::spawn(move || {
            for request in worker_server.incoming_requests() {
                handle_request(&worker_state, request);
            }
        });

        Ok(Self {
            server,
            state,
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.server.server_addr())
    }

    pub fn items(&self) -> Vec<Item> {
        lock(&self.state).items.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    /// Requests other than `GET`, in arrival order.
    pub fn mutations(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method != "GET")
            .collect()
    }

    /// Answer the next request with `status` and a FastAPI-style detail body.
    pub fn fail_next(&self, status: u16, detail: &str) {
        lock(&self.state).fail_next = Some((status, detail.to_owned()));
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn handle_request(state: &Mutex<MockState>, mut request: Request) {
    let mut body = String::new();
    let _ = request.as_reader().read_to_string(&mut body);
    let method = request.method().to_string();
    let url = request.url().to_owned();

    let (status, payload) = {
        let mut guard = lock(state);
        guard.requests.push(RecordedRequest {
            method: method.clone(),
            url: url.clone(),
            body: body.clone(),
        });
        match guard.fail_next.take() {
            Some((status, detail)) => (status, json!({ "detail": detail })),
            None => route(&mut guard, &method, &url, &body),
        }
    };

    let mut response = Response::from_string(payload.to_string()).with_status_code(status);
    if let Ok(header) = Header::from_bytes("Content-Type", "application/json") {
        response = response.with_header(header);
    }
    let _ = request.respond(response);
}

fn route(state: &mut MockState, method: &str, url: &str, body: &str) -> (u16, Value) {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        ("GET", "/health") => (200, json!({ "status": "ok" })),
        ("GET", "/items") => {
            let mut items = state.items.clone();
            items.sort_by_key(|item| item.id);
            (200, json!(items))
        }
        ("POST", "/items") => create(state, body),
        (_, path) => match path.strip_prefix("/items/").map(str::parse::<i64>) {
            Some(Ok(id)) => item_route(state, method, ItemId::new(id), body),
            _ => not_found("Not Found"),
        },
    }
}

fn create(state: &mut MockState, body: &str) -> (u16, Value) {
    let Ok(fields) = serde_json::from_str::<Value>(body) else {
        return unprocessable("invalid JSON body");
    };
    let Some(name) = fields.get("name").and_then(Value::as_str) else {
        return unprocessable("field required");
    };

    let item = Item {
        id: ItemId::new(state.next_id),
        name: name.to_owned(),
        description: optional_text(&fields, "description"),
        quantity: fields.get("quantity").and_then(Value::as_i64).unwrap_or(0),
        location: optional_text(&fields, "location"),
        created_at: Some(fixture_timestamp().to_owned()),
    };
    state.next_id += 1;
    state.items.push(item.clone());
    (200, json!(item))
}

fn item_route(state: &mut MockState, method: &str, id: ItemId, body: &str) -> (u16, Value) {
    let Some(index) = state.items.iter().position(|item| item.id == id) else {
        return not_found("Item not found");
    };
    match method {
        "GET" => (200, json!(state.items[index])),
        "PUT" => {
            let Ok(fields) = serde_json::from_str::<Value>(body) else {
                return unprocessable("invalid JSON body");
            };
            let item = &mut state.items[index];
            if let Some(name) = fields.get("name").and_then(Value::as_str) {
                item.name = name.to_owned();
            }
            if fields.get("description").is_some() {
                item.description = optional_text(&fields, "description");
            }
            if let Some(quantity) = fields.get("quantity").and_then(Value::as_i64) {
                item.quantity = quantity;
            }
            if fields.get("location").is_some() {
                item.location = optional_text(&fields, "location");
            }
            (200, json!(item))
        }
        "DELETE" => {
            state.items.remove(index);
            (200, json!({ "ok": true }))
        }
        _ => (405, json!({ "detail": "Method Not Allowed" })),
    }
}

fn optional_text(fields: &Value, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn not_found(detail: &str) -> (u16, Value) {
    (404, json!({ "detail": detail }))
}

fn unprocessable(message: &str) -> (u16, Value) {
    (422, json!({ "detail": [{ "msg": message }] }))
}
