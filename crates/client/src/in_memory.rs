//! In-memory back-office API.
//!
//! Implements the same route conventions and envelopes as the real API for
//! registered collections, records every request it receives, and can be told
//! to fail the next call. Used by tests and offline demos.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use grocerdesk_core::ClientError;
use serde_json::{Map, Value, json};

use crate::collection::{AuthPolicy, Collection};
use crate::envelope::Envelope;
use crate::payload::{MultipartForm, PartValue};
use crate::transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};

#[derive(Debug, Default)]
pub struct InMemoryTransport {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<&'static str, Store>,
    requests: Vec<ApiRequest>,
    scripted: VecDeque<Scripted>,
    next_id: u64,
}

#[derive(Debug)]
struct Store {
    auth: AuthPolicy,
    list_envelope: Envelope,
    record_envelope: Envelope,
    records: Vec<Map<String, Value>>,
}

#[derive(Debug)]
enum Scripted {
    Respond(ApiResponse),
    Disconnect,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `T`'s routes with an empty collection.
    pub fn register<T: Collection>(&self) {
        store_for::<T>(&mut self.lock());
    }

    /// Register `T` and append `records` to it.
    pub fn seed<T: Collection>(&self, records: impl IntoIterator<Item = T>) {
        let mut state = self.lock();
        let store = store_for::<T>(&mut state);
        for record in records {
            if let Ok(Value::Object(map)) = serde_json::to_value(&record) {
                store.records.push(map);
            }
        }
    }

    /// Current server-side records of `T`.
    pub fn records<T: Collection>(&self) -> Vec<T> {
        self.lock()
            .collections
            .get(T::BASE_PATH)
            .map(|store| {
                store
                    .records
                    .iter()
                    .filter_map(|r| serde_json::from_value(Value::Object(r.clone())).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Answer the next request with `status` and `{ "message": message }`.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.respond_next(ApiResponse::json_value(status, &json!({ "message": message })));
    }

    /// Answer the next request with an arbitrary response.
    pub fn respond_next(&self, response: ApiResponse) {
        self.lock().scripted.push_back(Scripted::Respond(response));
    }

    /// Fail the next request as if the network were down.
    pub fn disconnect_next(&self) {
        self.lock().scripted.push_back(Scripted::Disconnect);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn store_for<T: Collection>(state: &mut State) -> &mut Store {
    state.collections.entry(T::BASE_PATH).or_insert_with(|| Store {
        auth: T::AUTH,
        list_envelope: T::LIST_ENVELOPE,
        record_envelope: T::RECORD_ENVELOPE,
        records: Vec::new(),
    })
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        match state.scripted.pop_front() {
            Some(Scripted::Respond(response)) => return Ok(response),
            Some(Scripted::Disconnect) => {
                return Err(ClientError::network("connection refused (in-memory)"));
            }
            None => {}
        }

        Ok(state.handle(request))
    }
}

impl State {
    fn handle(&mut self, request: ApiRequest) -> ApiResponse {
        let Some((base, route)) = self.route(&request.path) else {
            return message(404, "route not found");
        };

        let next_id = &mut self.next_id;
        let Some(store) = self.collections.get_mut(base) else {
            return message(404, "route not found");
        };

        if store.auth == AuthPolicy::Bearer && request.bearer.is_none() {
            return message(401, "Unauthorized");
        }

        match (request.method, route) {
            (Method::Get, Route::List) => {
                let items = store.records.iter().cloned().map(Value::Object).collect();
                ApiResponse::json_value(200, &store.list_envelope.wrap(Value::Array(items)))
            }
            (Method::Get, Route::Get(id)) => match store.find(&id) {
                Some(index) => store.respond_record(200, index),
                None => message(404, "record not found"),
            },
            (Method::Post, Route::Create) => {
                let Some(mut fields) = body_fields(request.body) else {
                    return message(400, "request body must be an object");
                };
                *next_id += 1;
                fields.insert("id".to_string(), Value::String(format!("mem-{next_id}")));
                store.records.push(fields);
                store.respond_record(201, store.records.len() - 1)
            }
            (Method::Patch, Route::Update(id)) => {
                let Some(index) = store.find(&id) else {
                    return message(404, "record not found");
                };
                let Some(fields) = body_fields(request.body) else {
                    return message(400, "request body must be an object");
                };
                for (key, value) in fields {
                    if key != "id" {
                        store.records[index].insert(key, value);
                    }
                }
                store.respond_record(200, index)
            }
            (Method::Delete, Route::Delete(id)) => match store.find(&id) {
                Some(index) => {
                    store.records.remove(index);
                    message(200, "deleted")
                }
                None => message(404, "record not found"),
            },
            _ => message(405, "method not allowed"),
        }
    }

    fn route(&self, path: &str) -> Option<(&'static str, Route)> {
        let (base, rest) = self
            .collections
            .keys()
            .filter_map(|base| path.strip_prefix(base).map(|rest| (*base, rest)))
            .find(|(_, rest)| rest.starts_with('/'))?;

        let segment = |id: &str| {
            if id.contains('/') {
                return None;
            }
            urlencoding::decode(id).ok().map(|id| id.into_owned())
        };
        let route = match rest.trim_start_matches('/').split_once('/') {
            None if rest == "/get" => Route::List,
            None if rest == "/create" => Route::Create,
            Some(("get", id)) => Route::Get(segment(id)?),
            Some(("update", id)) => Route::Update(segment(id)?),
            Some(("delete", id)) => Route::Delete(segment(id)?),
            _ => return None,
        };
        Some((base, route))
    }
}

enum Route {
    List,
    Get(String),
    Create,
    Update(String),
    Delete(String),
}

impl Store {
    fn find(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.get("id").and_then(Value::as_str) == Some(id))
    }

    fn respond_record(&self, status: u16, index: usize) -> ApiResponse {
        let record = Value::Object(self.records[index].clone());
        ApiResponse::json_value(status, &self.record_envelope.wrap(record))
    }
}

fn message(status: u16, text: &str) -> ApiResponse {
    ApiResponse::json_value(status, &json!({ "message": text }))
}

fn body_fields(body: RequestBody) -> Option<Map<String, Value>> {
    match body {
        RequestBody::Json(Value::Object(map)) => Some(map),
        RequestBody::Multipart(form) => Some(multipart_fields(form)),
        RequestBody::Empty => Some(Map::new()),
        RequestBody::Json(_) => None,
    }
}

/// Decode a multipart body the way a typical upload handler would: text parts
/// that parse as JSON keep their type, files become stored URLs.
fn multipart_fields(form: MultipartForm) -> Map<String, Value> {
    let mut fields = Map::new();
    for part in form.parts {
        let value = match part.value {
            PartValue::Text(text) => {
                serde_json::from_str(&text).unwrap_or(Value::String(text))
            }
            PartValue::File(file) => Value::String(format!("memory://uploads/{}", file.file_name)),
        };

        match fields.get_mut(&part.name) {
            // Repeated file fields (galleries) collect into an array.
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(part.name, value);
            }
        }
    }
    fields
}
