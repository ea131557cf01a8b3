#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use services::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use storage::repository::{InMemoryKeyValueStore, KeyValueStore, StorageError};
use tokio::sync::Notify;

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<HttpResponse, TransportError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(Ok(json_response(status, &body.to_string())))
    }

    pub fn push_text(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_owned(),
        }))
    }

    pub fn push_error(&self, message: &str) -> &Self {
        self.push(Err(TransportError::new(message.to_owned())))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

pub fn json_response(status: u16, body: &str) -> HttpResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    HttpResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: body.to_owned(),
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::new("no scripted response")))
    }
}

/// Store whose every operation fails.
pub struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }
}

/// In-memory store whose `set` signals `entered` and then waits on `release`.
#[derive(Clone, Default)]
pub struct GatedStore {
    pub inner: InMemoryKeyValueStore,
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}
