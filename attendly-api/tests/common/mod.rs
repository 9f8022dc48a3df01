/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An application over a fresh in-memory storage backend
/// - JSON request helpers driving the router with `oneshot`
/// - Fixture creation through the HTTP surface

use attendly_api::app::{build_router, AppState};
use attendly_api::config::{ApiConfig, Config};
use attendly_shared::config::StorageConfig;
use attendly_shared::storage::Storage;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates a new test context over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_storage(Storage::in_memory())
    }

    pub fn with_storage(storage: Storage) -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            storage: StorageConfig::default(),
        };

        let state = AppState::new(storage, config);
        let app = build_router(state.clone());
        Self { app, state }
    }

    /// Sends a request and returns status plus parsed JSON body
    ///
    /// An empty body parses as `Value::Null`.
    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request("DELETE", uri, None).await
    }

    /// Creates an organization and returns its id
    pub async fn create_organization(&self, name: &str) -> String {
        let (status, body) = self
            .post("/v1/organizations", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a group and returns its id
    pub async fn create_group(&self, org_id: &str, name: &str, order: i32) -> String {
        let (status, body) = self
            .post(
                &format!("/v1/organizations/{}/groups", org_id),
                serde_json::json!({ "name": name, "order": order }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates a member and returns its id
    pub async fn create_member(&self, org_id: &str, group_id: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                &format!("/v1/organizations/{}/members", org_id),
                serde_json::json!({ "groupId": group_id, "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Creates an event date and returns its id
    pub async fn create_event_date(&self, org_id: &str, date: &str) -> String {
        let (status, body) = self
            .post(
                &format!("/v1/organizations/{}/event-dates", org_id),
                serde_json::json!({ "date": date, "title": "Rehearsal" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}
