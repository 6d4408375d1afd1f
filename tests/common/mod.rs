//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use menu_server::{
    app,
    config::Config,
    state::AppState,
    store::{MemoryStore, RecordStore, StoreError, StoreResult},
};
use mongodb::bson::{oid::ObjectId, Document};
use serde_json::Value;
use tower::ServiceExt;

pub fn router_with(store: Arc<dyn RecordStore>) -> Router {
    router_with_config(store, &Config::default())
}

pub fn router_with_config(store: Arc<dyn RecordStore>, config: &Config) -> Router {
    app(AppState::new(store), config)
}

pub fn memory_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (router_with(store.clone()), store)
}

/// Send one request through a fresh clone of the router and decode the JSON
/// envelope that comes back.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// The payload inside `{"data": {"data": ..}}`.
pub fn payload(envelope: &Value) -> &Value {
    &envelope["data"]["data"]
}

/// Create a record and return its id.
pub async fn create(app: &Router, path: &str, body: Value) -> String {
    let (status, json) = send(app, Method::POST, path, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    payload(&json)["InsertedID"].as_str().unwrap().to_string()
}

/// A store whose every call fails, standing in for an unreachable database.
pub struct FailingStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unexpected("connection refused".to_string()))
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn insert_one(&self, _: &str, _: Document) -> StoreResult<ObjectId> {
        down()
    }

    async fn find_one(&self, _: &str, _: ObjectId) -> StoreResult<Option<Document>> {
        down()
    }

    async fn find_all(&self, _: &str) -> StoreResult<Vec<Document>> {
        down()
    }

    async fn find_one_and_update(&self, _: &str, _: ObjectId, _: Document) -> StoreResult<Option<Document>> {
        down()
    }

    async fn delete_one(&self, _: &str, _: ObjectId) -> StoreResult<u64> {
        down()
    }
}
